// RSA Signature Verification
// PKCS#1 v1.5 verification with a constant-time comparison of the encoded block

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use subtle::ConstantTimeEq;
use tracing::debug;

use super::bigint::{from_bytes, mod_pow, to_bytes_padded};
use super::codec::decode_public_pkix;
use super::digest::DigestAlgorithm;
use super::key::RsaPublicKey;
use super::padding::pad_for_signature;
use crate::error::{Result, RsaError};

/// Verify `signature` over `message` with a decoded public key
///
/// `Ok(false)` means the signature does not match. Errors are reserved for
/// inputs on which no check can be attempted.
pub fn verify_with_key(
    message: &[u8],
    public_key: &RsaPublicKey,
    signature: &[u8],
    digest: DigestAlgorithm,
) -> Result<bool> {
    let k = public_key.size();
    if signature.len() != k {
        return Err(RsaError::SignatureLength {
            expected: k,
            actual: signature.len(),
        });
    }

    // No signature can match under a key too small for the DigestInfo block
    let expected =
        match pad_for_signature(&digest.digest(message), digest.digest_info_prefix(), k) {
            Ok(em) => em,
            Err(RsaError::PayloadTooLarge { .. }) => {
                debug!(modulus_bytes = k, %digest, "key too small for digest block");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

    let s = from_bytes(signature);
    if s >= public_key.n {
        debug!("signature representative out of range");
        return Ok(false);
    }

    let m = mod_pow(&s, &public_key.e, &public_key.n);
    let em = match to_bytes_padded(&m, k) {
        Some(em) => em,
        None => return Ok(false),
    };

    Ok(bool::from(em.as_slice().ct_eq(expected.as_slice())))
}

/// Verify with a SubjectPublicKeyInfo DER public key
pub fn verify(
    message: &[u8],
    public_key_der: &[u8],
    signature: &[u8],
    digest: DigestAlgorithm,
) -> Result<bool> {
    let public_key = decode_public_pkix(public_key_der)?;
    verify_with_key(message, &public_key, signature, digest)
}

/// Verify a SHA-1 signature
pub fn verify_sha1(message: &[u8], public_key_der: &[u8], signature: &[u8]) -> Result<bool> {
    verify(message, public_key_der, signature, DigestAlgorithm::Sha1)
}

/// Verify a standard base64 signature
pub fn verify_from_base64(
    message: &[u8],
    public_key_der: &[u8],
    signature_base64: &str,
    digest: DigestAlgorithm,
) -> Result<bool> {
    let signature = BASE64.decode(signature_base64)?;
    verify(message, public_key_der, &signature, digest)
}
