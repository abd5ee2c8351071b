// PEM Armoring
// Base64 text framing of DER with BEGIN/END labels (RFC 7468)

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use super::codec::{
    decode_private_pkcs1, decode_private_pkcs8, decode_public_pkcs1, decode_public_pkix,
    encode_private_pkcs1, encode_public_pkix,
};
use super::key::{RsaPrivateKey, RsaPublicKey};
use crate::error::{Result, RsaError};

pub const RSA_PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";
pub const RSA_PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

const LINE_WIDTH: usize = 64;

/// A decoded PEM block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock {
    pub label: String,
    pub der: Vec<u8>,
}

/// Armor DER bytes under the given label
pub fn wrap_pem(der: &[u8], label: &str) -> String {
    let body = BASE64.encode(der);
    let mut out = String::with_capacity(body.len() + body.len() / LINE_WIDTH + 2 * label.len() + 40);

    out.push_str("-----BEGIN ");
    out.push_str(label);
    out.push_str("-----\n");
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        // base64 output is ASCII
        out.push_str(&String::from_utf8_lossy(line));
        out.push('\n');
    }
    out.push_str("-----END ");
    out.push_str(label);
    out.push_str("-----\n");

    out
}

/// Find the first PEM block in `text`, returning its label and contents
pub fn parse_pem(text: &str) -> Result<PemBlock> {
    const BEGIN: &str = "-----BEGIN ";
    const DASHES: &str = "-----";

    let start = text
        .find(BEGIN)
        .ok_or_else(|| RsaError::Format("no PEM block found".to_string()))?;
    let after_begin = &text[start + BEGIN.len()..];

    let label_end = after_begin
        .find(DASHES)
        .ok_or_else(|| RsaError::Format("unterminated PEM header".to_string()))?;
    let label = &after_begin[..label_end];
    if label.contains('\n') {
        return Err(RsaError::Format("malformed PEM header".to_string()));
    }

    let body_and_rest = &after_begin[label_end + DASHES.len()..];
    let footer = format!("-----END {}-----", label);
    let body_end = body_and_rest
        .find(&footer)
        .ok_or_else(|| RsaError::Format(format!("missing PEM footer for {}", label)))?;

    let mut encoded = String::new();
    for line in body_and_rest[..body_end].lines() {
        let line = line.trim();
        // RFC 1421 encapsulated headers (e.g. Proc-Type) carry no key data
        if line.is_empty() || line.contains(':') {
            continue;
        }
        encoded.push_str(line);
    }

    let der = BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| RsaError::Format(format!("invalid PEM body: {}", e)))?;

    Ok(PemBlock {
        label: label.to_string(),
        der,
    })
}

/// Unwrap the first PEM block in `text` to its DER bytes
pub fn unwrap_pem(text: &str) -> Result<Vec<u8>> {
    parse_pem(text).map(|block| block.der)
}

/// PEM-encode a private key as "RSA PRIVATE KEY" (PKCS#1)
pub fn private_key_to_pem(key: &RsaPrivateKey) -> String {
    wrap_pem(&encode_private_pkcs1(key), RSA_PRIVATE_KEY_LABEL)
}

/// PEM-encode a public key as "RSA PUBLIC KEY" holding SubjectPublicKeyInfo DER
pub fn public_key_to_pem(key: &RsaPublicKey) -> Result<String> {
    Ok(wrap_pem(&encode_public_pkix(key)?, RSA_PUBLIC_KEY_LABEL))
}

/// Decode a PEM private key, accepting PKCS#1 and PKCS#8 blocks
pub fn private_key_from_pem(text: &str) -> Result<RsaPrivateKey> {
    let block = parse_pem(text)?;
    match block.label.as_str() {
        RSA_PRIVATE_KEY_LABEL => decode_private_pkcs1(&block.der),
        PRIVATE_KEY_LABEL => decode_private_pkcs8(&block.der),
        other => Err(RsaError::Format(format!("unexpected PEM label: {}", other))),
    }
}

/// Decode a PEM public key.
/// "RSA PUBLIC KEY" blocks may carry either SubjectPublicKeyInfo or bare PKCS#1.
pub fn public_key_from_pem(text: &str) -> Result<RsaPublicKey> {
    let block = parse_pem(text)?;
    match block.label.as_str() {
        PUBLIC_KEY_LABEL => decode_public_pkix(&block.der),
        RSA_PUBLIC_KEY_LABEL => {
            decode_public_pkix(&block.der).or_else(|_| decode_public_pkcs1(&block.der))
        }
        other => Err(RsaError::Format(format!("unexpected PEM label: {}", other))),
    }
}
