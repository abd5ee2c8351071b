// RSA Decryption Implementation
// Implements RSA decryption with Chinese Remainder Theorem (CRT) optimization

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use zeroize::Zeroizing;

use super::bigint::{from_bytes, mod_pow, to_bytes_padded, RsaBigInt};
use super::codec::decode_private_pkcs1;
use super::key::{CrtParams, RsaPrivateKey};
use super::padding::unpad_pkcs1_v15;
use crate::error::{Result, RsaError};

/// Decrypt ciphertext bytes with a decoded private key
pub fn decrypt_with_key(ciphertext: &[u8], private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
    // Validate ciphertext size
    let k = private_key.size();
    if ciphertext.len() != k {
        return Err(RsaError::KeyMismatch {
            expected: k,
            actual: ciphertext.len(),
        });
    }

    let c = from_bytes(ciphertext);
    if c >= private_key.n {
        return Err(RsaError::Padding);
    }

    let m = private_exponentiation(&c, private_key);
    let em = Zeroizing::new(to_bytes_padded(&m, k).ok_or(RsaError::Padding)?);

    unpad_pkcs1_v15(&em, k)
}

/// Decrypt ciphertext bytes with a PKCS#1 DER private key
pub fn decrypt(ciphertext: &[u8], private_key_der: &[u8]) -> Result<Vec<u8>> {
    let private_key = decode_private_pkcs1(private_key_der)?;
    decrypt_with_key(ciphertext, &private_key)
}

/// Decrypt standard base64 ciphertext with a PKCS#1 DER private key
pub fn decrypt_from_base64(encrypted: &str, private_key_der: &[u8]) -> Result<Vec<u8>> {
    let ciphertext = BASE64.decode(encrypted)?;
    decrypt(&ciphertext, private_key_der)
}

/// Raw RSA private operation: c^d mod n, through CRT when the key carries it
pub(crate) fn private_exponentiation(c: &RsaBigInt, key: &RsaPrivateKey) -> RsaBigInt {
    match &key.crt {
        Some(crt) => decrypt_crt(c, crt, &key.n),
        None => mod_pow(c, &key.d, &key.n),
    }
}

/// Decrypt using Chinese Remainder Theorem (CRT)
/// This is faster than regular decryption because we work with smaller numbers
fn decrypt_crt(c: &RsaBigInt, crt: &CrtParams, n: &RsaBigInt) -> RsaBigInt {
    // m1 = c^d_p mod p
    let m1 = mod_pow(c, &crt.d_p, &crt.p);

    // m2 = c^d_q mod q
    let m2 = mod_pow(c, &crt.d_q, &crt.q);

    // h = (m1 - m2) * q_inv mod p, with m2 reduced mod p first
    let m2_mod_p = &m2 % &crt.p;
    let diff = if m1 >= m2_mod_p {
        m1 - &m2_mod_p
    } else {
        m1 + &crt.p - &m2_mod_p
    };
    let h = (diff * &crt.q_inv) % &crt.p;

    // m = m2 + q * h
    (m2 + &crt.q * h) % n
}
