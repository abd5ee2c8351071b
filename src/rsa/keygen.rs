// RSA Key Generation
// Implements RSA key pair generation (public and private keys)

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info, warn};

use super::bigint::{from_u64, mod_inverse, random_prime, RsaBigInt};
use super::codec::{encode_private_pkcs1, encode_public_pkix};
use super::key::{CrtParams, KeyPair, RsaPrivateKey};
use crate::config::{KeyGenConfig, DEFAULT_KEY_BITS, PUBLIC_EXPONENT};
use crate::error::{Result, RsaError};

/// Below this size there are too few primes of the required shape
pub const MIN_KEY_BITS: usize = 64;

/// Generate an RSA private key whose modulus has exactly `bit_length` bits
///
/// The two primes have `bit_length - bit_length / 2` and `bit_length / 2`
/// bits with their top two bits set, so the product never falls short.
/// `e` is fixed to 65537.
pub fn generate_private_key<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    bit_length: usize,
    config: &KeyGenConfig,
) -> Result<RsaPrivateKey> {
    if bit_length < MIN_KEY_BITS {
        return Err(RsaError::Generation(format!(
            "key size {} is below the minimum of {} bits",
            bit_length, MIN_KEY_BITS
        )));
    }

    let e = from_u64(PUBLIC_EXPONENT as u64);
    let p_bits = bit_length - bit_length / 2;
    let q_bits = bit_length / 2;

    for attempt in 1..=config.max_key_attempts {
        // Step 1: Generate two random primes p and q
        let p = draw_prime(rng, p_bits, config)?;
        let q = draw_prime(rng, q_bits, config)?;

        if p == q {
            continue;
        }

        // Ensure p > q (for q_inv calculation)
        let (p, q) = if p < q { (q, p) } else { (p, q) };

        // Step 2: Compute n = p * q
        let n = &p * &q;
        if n.bits() as usize != bit_length {
            continue;
        }

        // Step 3: Compute d = e^(-1) mod (p-1)(q-1).
        // No inverse means gcd(e, p-1) or gcd(e, q-1) is not 1.
        let p_minus_1 = &p - 1u8;
        let q_minus_1 = &q - 1u8;
        let phi_n = &p_minus_1 * &q_minus_1;
        let d = match mod_inverse(&e, &phi_n) {
            Some(d) => d,
            None => {
                debug!(attempt, "e not invertible modulo phi(n), retrying");
                continue;
            }
        };

        // Step 4: CRT parameters for faster private operations
        let d_p = &d % &p_minus_1;
        let d_q = &d % &q_minus_1;
        let q_inv = match mod_inverse(&q, &p) {
            Some(inv) => inv,
            None => continue,
        };

        info!(bits = bit_length, attempt, "generated RSA key");

        return Ok(RsaPrivateKey {
            n,
            e,
            d,
            crt: Some(CrtParams { p, q, d_p, d_q, q_inv }),
        });
    }

    warn!(
        bits = bit_length,
        attempts = config.max_key_attempts,
        "RSA key generation did not converge"
    );
    Err(RsaError::Generation(format!(
        "no valid key found after {} attempts",
        config.max_key_attempts
    )))
}

fn draw_prime<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    bits: usize,
    config: &KeyGenConfig,
) -> Result<RsaBigInt> {
    random_prime(rng, bits, config.miller_rabin_rounds, config.max_prime_candidates).ok_or_else(
        || {
            warn!(bits, candidates = config.max_prime_candidates, "prime search exhausted");
            RsaError::Generation(format!(
                "no {}-bit prime found within {} candidates",
                bits, config.max_prime_candidates
            ))
        },
    )
}

/// Generate an encoded key pair from an explicit random source
///
/// The public key is SubjectPublicKeyInfo DER, the private key PKCS#1 DER.
pub fn generate_with_rng<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    bit_length: usize,
    config: &KeyGenConfig,
) -> Result<KeyPair> {
    let private_key = generate_private_key(rng, bit_length, config)?;
    let public_key = encode_public_pkix(&private_key.to_public_key())?;

    Ok(KeyPair {
        public_key,
        private_key: encode_private_pkcs1(&private_key),
    })
}

/// Generate an RSA key pair with specified bit length from the OS random source
pub fn generate_keypair(bit_length: usize) -> Result<KeyPair> {
    generate_with_rng(&mut OsRng, bit_length, &KeyGenConfig::default())
}

/// Generate RSA key pair with default settings (2048 bits, e=65537)
pub fn generate_default_keypair() -> Result<KeyPair> {
    generate_keypair(DEFAULT_KEY_BITS)
}
