// RSA Module - Main module file
// Exports all RSA-related functionality

pub mod bigint;
pub mod codec;
pub mod decrypt;
pub mod der;
pub mod digest;
pub mod encrypt;
pub mod extract;
pub mod key;
pub mod keygen;
pub mod padding;
pub mod pem;
pub mod sign;
pub mod verify;

pub use codec::{
    convert_pkcs1_to_pkcs8, convert_pkcs8_to_pkcs1, decode_private_pkcs1, decode_private_pkcs8,
    decode_public_pkcs1, decode_public_pkix, encode_private_pkcs1, encode_private_pkcs8,
    encode_public_pkcs1, encode_public_pkix,
};
pub use decrypt::{decrypt, decrypt_from_base64, decrypt_with_key};
pub use digest::DigestAlgorithm;
pub use encrypt::{encrypt, encrypt_base64, encrypt_with_key, encrypt_with_rng};
pub use extract::{extract_public_key, extract_public_key_base64};
pub use key::{CrtParams, KeyPair, RsaPrivateKey, RsaPublicKey};
pub use keygen::{
    generate_default_keypair, generate_keypair, generate_keypair as generate,
    generate_private_key, generate_with_rng,
};
pub use pem::{
    parse_pem, private_key_from_pem, private_key_to_pem, public_key_from_pem, public_key_to_pem,
    unwrap_pem, wrap_pem, PemBlock,
};
pub use sign::{sign, sign_base64, sign_sha1, sign_with_key};
pub use verify::{verify, verify_from_base64, verify_sha1, verify_with_key};
