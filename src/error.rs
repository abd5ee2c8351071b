// RSA Error Types
// Every failure crosses the public API as a value of RsaError

use thiserror::Error;

/// Errors produced by the RSA core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RsaError {
    /// Malformed key encoding
    #[error("parse error: {0}")]
    Parse(String),

    /// A well-formed key container holds something other than an RSA key
    #[error("key type error: {0}")]
    KeyType(String),

    /// Malformed base64/text input, or output that cannot be represented
    #[error("encoding error: {0}")]
    Encoding(String),

    /// No usable PEM block in the input text
    #[error("format error: {0}")]
    Format(String),

    /// Plaintext (or digest) exceeds what the modulus can carry after padding
    #[error("payload too large: max {max} bytes, got {actual}")]
    PayloadTooLarge { max: usize, actual: usize },

    /// Decryption failed. Deliberately carries no detail.
    #[error("decryption error: invalid padding")]
    Padding,

    /// Ciphertext length does not match the modulus length of the key
    #[error("key mismatch: expected {expected}-byte ciphertext, got {actual} bytes")]
    KeyMismatch { expected: usize, actual: usize },

    /// Signature length does not match the modulus length of the key
    #[error("signature length error: expected {expected} bytes, got {actual}")]
    SignatureLength { expected: usize, actual: usize },

    /// Key pair generation did not converge
    #[error("key generation failed: {0}")]
    Generation(String),

    /// A worker panicked or could not be started
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for RSA operations
pub type Result<T> = std::result::Result<T, RsaError>;

impl RsaError {
    /// Short, stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            RsaError::Parse(_) => "ParseError",
            RsaError::KeyType(_) => "KeyTypeError",
            RsaError::Encoding(_) => "EncodingError",
            RsaError::Format(_) => "FormatError",
            RsaError::PayloadTooLarge { .. } => "PayloadTooLargeError",
            RsaError::Padding => "PaddingError",
            RsaError::KeyMismatch { .. } => "KeyMismatchError",
            RsaError::SignatureLength { .. } => "SignatureLengthError",
            RsaError::Generation(_) => "GenerationError",
            RsaError::Internal(_) => "InternalError",
        }
    }
}

impl From<base64::DecodeError> for RsaError {
    fn from(e: base64::DecodeError) -> Self {
        RsaError::Encoding(format!("invalid base64: {}", e))
    }
}
