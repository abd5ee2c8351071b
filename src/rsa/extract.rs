// Public Key Extraction

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use super::codec::{decode_private_pkcs1, encode_public_pkix};
use crate::error::Result;

/// Derive the SubjectPublicKeyInfo DER public key from a PKCS#1 DER private key
pub fn extract_public_key(private_key_der: &[u8]) -> Result<Vec<u8>> {
    let private_key = decode_private_pkcs1(private_key_der)?;
    encode_public_pkix(&private_key.to_public_key())
}

/// Same as `extract_public_key`, base64 encoded
pub fn extract_public_key_base64(private_key_der: &[u8]) -> Result<String> {
    extract_public_key(private_key_der).map(|der| BASE64.encode(der))
}
