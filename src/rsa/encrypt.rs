// RSA Encryption Implementation
// Implements RSA encryption with PKCS#1 v1.5 padding

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use super::bigint::{from_bytes, mod_pow, to_bytes_padded};
use super::codec::decode_public_pkix;
use super::key::RsaPublicKey;
use super::padding::pad_pkcs1_v15;
use crate::error::{Result, RsaError};

/// Encrypt bytes with a decoded public key
/// Returns ciphertext of exactly the modulus length
pub fn encrypt_with_key<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    plaintext: &[u8],
    public_key: &RsaPublicKey,
) -> Result<Vec<u8>> {
    let k = public_key.size();

    // Apply PKCS#1 v1.5 padding
    let padded = pad_pkcs1_v15(rng, plaintext, k)?;

    // Compute c = m^e mod n
    let m = from_bytes(&padded);
    let c = mod_pow(&m, &public_key.e, &public_key.n);

    to_bytes_padded(&c, k)
        .ok_or_else(|| RsaError::Encoding("ciphertext exceeds modulus length".to_string()))
}

/// Encrypt bytes with a SubjectPublicKeyInfo DER key and an explicit random source
pub fn encrypt_with_rng<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    plaintext: &[u8],
    public_key_der: &[u8],
) -> Result<Vec<u8>> {
    let public_key = decode_public_pkix(public_key_der)?;
    encrypt_with_key(rng, plaintext, &public_key)
}

/// Encrypt bytes with a SubjectPublicKeyInfo DER key
pub fn encrypt(plaintext: &[u8], public_key_der: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_rng(&mut OsRng, plaintext, public_key_der)
}

/// Encrypt bytes and return the ciphertext as standard base64
pub fn encrypt_base64(plaintext: &[u8], public_key_der: &[u8]) -> Result<String> {
    let ciphertext = encrypt(plaintext, public_key_der)?;
    Ok(BASE64.encode(ciphertext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::keygen::generate_keypair;

    #[test]
    fn test_encrypt_bytes() {
        let keypair = generate_keypair(512).unwrap();
        let message = b"Hello, RSA!";

        let ciphertext = encrypt(message, &keypair.public_key).unwrap();
        assert_eq!(ciphertext.len(), 64); // 512 bits = 64 bytes
        assert_ne!(&ciphertext[..message.len()], message);
    }

    #[test]
    fn test_encrypt_is_randomized() {
        let keypair = generate_keypair(512).unwrap();

        let a = encrypt(b"same", &keypair.public_key).unwrap();
        let b = encrypt(b"same", &keypair.public_key).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_encrypt_limit() {
        let keypair = generate_keypair(512).unwrap();

        assert!(encrypt(&[7u8; 53], &keypair.public_key).is_ok());
        assert_eq!(
            encrypt(&[7u8; 54], &keypair.public_key).unwrap_err(),
            RsaError::PayloadTooLarge { max: 53, actual: 54 }
        );
    }

    #[test]
    fn test_encrypt_empty() {
        let keypair = generate_keypair(512).unwrap();
        let ciphertext = encrypt(b"", &keypair.public_key).unwrap();
        assert_eq!(ciphertext.len(), 64);
    }

    #[test]
    fn test_encrypt_bad_key() {
        let result = encrypt(b"data", b"\x30\x03\x02\x01\x01");
        assert!(matches!(result, Err(RsaError::Parse(_))));

        // A private key is not a public key
        let keypair = generate_keypair(512).unwrap();
        let result = encrypt(b"data", &keypair.private_key);
        assert!(matches!(result, Err(RsaError::Parse(_))));
    }

    #[test]
    fn test_encrypt_base64() {
        let keypair = generate_keypair(512).unwrap();
        let encoded = encrypt_base64(b"Test message", &keypair.public_key).unwrap();
        let raw = BASE64.decode(encoded).unwrap();
        assert_eq!(raw.len(), 64);
    }
}
