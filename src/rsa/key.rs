// RSA Key Types
// Logical key material decoded on demand from its encoded form

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use num_traits::Zero;

use super::bigint::{byte_length, RsaBigInt};

/// RSA Public Key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaPublicKey {
    pub n: RsaBigInt, // Modulus
    pub e: RsaBigInt, // Public exponent
}

/// Chinese Remainder Theorem parameters of a two-prime key
#[derive(Clone, PartialEq, Eq)]
pub struct CrtParams {
    pub p: RsaBigInt,     // First prime factor
    pub q: RsaBigInt,     // Second prime factor
    pub d_p: RsaBigInt,   // d mod (p-1)
    pub d_q: RsaBigInt,   // d mod (q-1)
    pub q_inv: RsaBigInt, // q^(-1) mod p
}

/// RSA Private Key
#[derive(Clone, PartialEq, Eq)]
pub struct RsaPrivateKey {
    pub n: RsaBigInt, // Modulus (same as public)
    pub e: RsaBigInt, // Public exponent
    pub d: RsaBigInt, // Private exponent
    pub crt: Option<CrtParams>,
}

// Never print secret material
impl std::fmt::Debug for CrtParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrtParams").finish_non_exhaustive()
    }
}

impl std::fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("bits", &self.n.bits())
            .field("e", &self.e)
            .field("crt", &self.crt.is_some())
            .finish_non_exhaustive()
    }
}

impl RsaPublicKey {
    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> usize {
        self.n.bits() as usize
    }

    /// Modulus length in bytes (k)
    pub fn size(&self) -> usize {
        byte_length(&self.n)
    }
}

impl RsaPrivateKey {
    /// Get the bit length of the modulus
    pub fn bit_length(&self) -> usize {
        self.n.bits() as usize
    }

    /// Modulus length in bytes (k)
    pub fn size(&self) -> usize {
        byte_length(&self.n)
    }

    /// The public half of this key
    pub fn to_public_key(&self) -> RsaPublicKey {
        RsaPublicKey {
            n: self.n.clone(),
            e: self.e.clone(),
        }
    }
}

impl CrtParams {
    /// Treat all-zero prime slots as "not present"
    pub(crate) fn from_components(
        p: RsaBigInt,
        q: RsaBigInt,
        d_p: RsaBigInt,
        d_q: RsaBigInt,
        q_inv: RsaBigInt,
    ) -> Option<Self> {
        if p.is_zero() || q.is_zero() {
            return None;
        }
        Some(Self { p, q, d_p, d_q, q_inv })
    }
}

/// Encoded RSA key pair as returned by the generator
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    /// SubjectPublicKeyInfo DER
    pub public_key: Vec<u8>,
    /// PKCS#1 RSAPrivateKey DER
    pub private_key: Vec<u8>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(&self.public_key))
            .field("private_key", &format!("<{} bytes>", self.private_key.len()))
            .finish()
    }
}

impl KeyPair {
    /// Base64 encoded public key
    pub fn public_key_base64(&self) -> String {
        BASE64.encode(&self.public_key)
    }

    /// Base64 encoded private key
    pub fn private_key_base64(&self) -> String {
        BASE64.encode(&self.private_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::bigint::from_u64;

    fn toy_key() -> RsaPrivateKey {
        // p = 61, q = 53, e = 17, d = 2753
        RsaPrivateKey {
            n: from_u64(3233),
            e: from_u64(17),
            d: from_u64(2753),
            crt: CrtParams::from_components(
                from_u64(61),
                from_u64(53),
                from_u64(53),
                from_u64(49),
                from_u64(38),
            ),
        }
    }

    #[test]
    fn test_sizes() {
        let key = toy_key();
        assert_eq!(key.bit_length(), 12);
        assert_eq!(key.size(), 2);
        assert_eq!(key.to_public_key().size(), 2);
    }

    #[test]
    fn test_debug_hides_private_exponent() {
        let rendered = format!("{:?}", toy_key());
        assert!(!rendered.contains("2753"));
        assert!(rendered.contains("bits"));
    }

    #[test]
    fn test_missing_primes_mean_no_crt() {
        let crt = CrtParams::from_components(
            from_u64(0),
            from_u64(0),
            from_u64(0),
            from_u64(0),
            from_u64(0),
        );
        assert!(crt.is_none());
    }

    #[test]
    fn test_keypair_base64() {
        let pair = KeyPair {
            public_key: vec![1, 2, 3],
            private_key: vec![0xff],
        };
        assert_eq!(pair.public_key_base64(), "AQID");
        assert_eq!(pair.private_key_base64(), "/w==");
        assert!(!format!("{:?}", pair).contains("ff"));
    }
}
