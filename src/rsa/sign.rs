// RSA Signature Generation
// PKCS#1 v1.5 signatures (RSASSA-PKCS1-v1_5) over SHA-256 or SHA-1

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use super::bigint::{from_bytes, mod_pow, to_bytes_padded};
use super::codec::decode_private_pkcs1;
use super::decrypt::private_exponentiation;
use super::digest::DigestAlgorithm;
use super::key::RsaPrivateKey;
use super::padding::pad_for_signature;
use crate::error::{Result, RsaError};

/// Sign `message` with a decoded private key
///
/// Deterministic: the same message, key and digest always give the same signature.
pub fn sign_with_key(
    message: &[u8],
    private_key: &RsaPrivateKey,
    digest: DigestAlgorithm,
) -> Result<Vec<u8>> {
    let k = private_key.size();
    let hashed = digest.digest(message);
    let em = pad_for_signature(&hashed, digest.digest_info_prefix(), k)?;

    let m = from_bytes(&em);
    let s = private_exponentiation(&m, private_key);

    // A faulty CRT result would leak a factor of n
    if mod_pow(&s, &private_key.e, &private_key.n) != m {
        return Err(RsaError::Parse(
            "private key CRT parameters are inconsistent".to_string(),
        ));
    }

    to_bytes_padded(&s, k)
        .ok_or_else(|| RsaError::Encoding("signature exceeds modulus length".to_string()))
}

/// Sign `message` with a PKCS#1 DER private key
pub fn sign(message: &[u8], private_key_der: &[u8], digest: DigestAlgorithm) -> Result<Vec<u8>> {
    let private_key = decode_private_pkcs1(private_key_der)?;
    sign_with_key(message, &private_key, digest)
}

/// Sign with SHA-1, for peers that cannot verify SHA-256
pub fn sign_sha1(message: &[u8], private_key_der: &[u8]) -> Result<Vec<u8>> {
    sign(message, private_key_der, DigestAlgorithm::Sha1)
}

/// Sign and return the signature as standard base64
pub fn sign_base64(
    message: &[u8],
    private_key_der: &[u8],
    digest: DigestAlgorithm,
) -> Result<String> {
    let signature = sign(message, private_key_der, digest)?;
    Ok(BASE64.encode(signature))
}
