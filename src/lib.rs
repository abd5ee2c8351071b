// secure_rsa
// RSA key generation, PKCS#1 v1.5 encryption and signatures, and key codecs

pub mod config;
pub mod error;
pub mod ffi;
pub mod rsa;
pub mod task;
pub mod util;

pub use config::{CliConfig, KeyGenConfig, DEFAULT_KEY_BITS, PUBLIC_EXPONENT};
pub use error::{Result, RsaError};
pub use rsa::{DigestAlgorithm, KeyPair, RsaPrivateKey, RsaPublicKey};
pub use task::TaskOutcome;
