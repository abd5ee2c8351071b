// RSA Key Codec
// Converts logical keys to and from PKCS#1, PKCS#8 and SubjectPublicKeyInfo DER

use num_traits::{One, Zero};
use tracing::debug;

use super::bigint::RsaBigInt;
use super::der::{
    encode_bit_string, encode_integer, encode_octet_string, encode_rsa_algorithm_identifier,
    encode_sequence, oid_to_string, DerReader, RSA_ENCRYPTION_OID,
};
use super::key::{CrtParams, RsaPrivateKey, RsaPublicKey};
use crate::error::{Result, RsaError};

/// Largest public exponent accepted on decode (2^31 - 1)
const MAX_PUBLIC_EXPONENT_BITS: u64 = 31;

fn check_public_components(n: &RsaBigInt, e: &RsaBigInt) -> Result<()> {
    if n.is_zero() || n.is_one() {
        return Err(RsaError::Parse("RSA modulus must be greater than one".to_string()));
    }
    if e < &RsaBigInt::from(2u8) {
        return Err(RsaError::Parse("RSA public exponent too small".to_string()));
    }
    if e.bits() > MAX_PUBLIC_EXPONENT_BITS {
        return Err(RsaError::Parse("RSA public exponent too large".to_string()));
    }
    Ok(())
}

fn check_private_components(key: &RsaPrivateKey) -> Result<()> {
    check_public_components(&key.n, &key.e)?;

    if key.d.is_zero() {
        return Err(RsaError::Parse("RSA private exponent is zero".to_string()));
    }

    if let Some(crt) = &key.crt {
        if &crt.p * &crt.q != key.n {
            return Err(RsaError::Parse("RSA modulus does not match its prime factors".to_string()));
        }
        let de = &key.d * &key.e;
        for prime in [&crt.p, &crt.q] {
            let prime_minus_one = prime - 1u8;
            if prime_minus_one.is_zero() || !(&de % &prime_minus_one).is_one() {
                return Err(RsaError::Parse("RSA exponents are inconsistent".to_string()));
            }
        }
        if crt.d_p != &key.d % (&crt.p - 1u8) || crt.d_q != &key.d % (&crt.q - 1u8) {
            return Err(RsaError::Parse("RSA CRT exponents are inconsistent".to_string()));
        }
        if !((&crt.q * &crt.q_inv) % &crt.p).is_one() {
            return Err(RsaError::Parse("RSA CRT coefficient is inconsistent".to_string()));
        }
    }

    Ok(())
}

/// Read an AlgorithmIdentifier and return its OID octets.
/// Parameters are checked only for rsaEncryption, where they must be NULL or absent.
fn read_algorithm<'a>(seq: &mut DerReader<'a>) -> Result<&'a [u8]> {
    let mut alg = seq.read_sequence()?;
    let oid = alg.read_oid()?;

    if oid == RSA_ENCRYPTION_OID {
        if !alg.is_empty() {
            alg.read_null()?;
        }
        alg.finish()?;
    }

    Ok(oid)
}

/// DER-encode a private key per PKCS#1 (RFC 8017 A.1.2)
pub fn encode_private_pkcs1(key: &RsaPrivateKey) -> Vec<u8> {
    let zero = RsaBigInt::zero();
    let (p, q, d_p, d_q, q_inv) = match &key.crt {
        Some(crt) => (&crt.p, &crt.q, &crt.d_p, &crt.d_q, &crt.q_inv),
        None => (&zero, &zero, &zero, &zero, &zero),
    };

    encode_sequence(&[
        encode_integer(&zero), // version: two-prime
        encode_integer(&key.n),
        encode_integer(&key.e),
        encode_integer(&key.d),
        encode_integer(p),
        encode_integer(q),
        encode_integer(d_p),
        encode_integer(d_q),
        encode_integer(q_inv),
    ])
}

/// Decode a PKCS#1 RSAPrivateKey
pub fn decode_private_pkcs1(der: &[u8]) -> Result<RsaPrivateKey> {
    let mut reader = DerReader::new(der);
    let mut seq = reader.read_sequence()?;
    reader.finish()?;

    match seq.read_small_integer()? {
        0 => {}
        1 => {
            return Err(RsaError::Parse(
                "multi-prime RSA private keys are not supported".to_string(),
            ))
        }
        v => return Err(RsaError::Parse(format!("unsupported RSA key version: {}", v))),
    }

    let n = seq.read_integer()?;
    let e = seq.read_integer()?;
    let d = seq.read_integer()?;
    let p = seq.read_integer()?;
    let q = seq.read_integer()?;
    let d_p = seq.read_integer()?;
    let d_q = seq.read_integer()?;
    let q_inv = seq.read_integer()?;
    seq.finish()?;

    let key = RsaPrivateKey {
        n,
        e,
        d,
        crt: CrtParams::from_components(p, q, d_p, d_q, q_inv),
    };
    check_private_components(&key)?;

    Ok(key)
}

/// DER-encode a bare PKCS#1 RSAPublicKey
pub fn encode_public_pkcs1(key: &RsaPublicKey) -> Result<Vec<u8>> {
    if key.n.is_zero() || key.e.is_zero() {
        return Err(RsaError::Encoding(
            "RSA public key with zero modulus or exponent".to_string(),
        ));
    }
    Ok(encode_sequence(&[encode_integer(&key.n), encode_integer(&key.e)]))
}

/// Decode a bare PKCS#1 RSAPublicKey
pub fn decode_public_pkcs1(der: &[u8]) -> Result<RsaPublicKey> {
    let mut reader = DerReader::new(der);
    let mut seq = reader.read_sequence()?;
    reader.finish()?;

    let n = seq.read_integer()?;
    let e = seq.read_integer()?;
    seq.finish()?;

    check_public_components(&n, &e)?;
    Ok(RsaPublicKey { n, e })
}

/// DER-encode a public key as X.509 SubjectPublicKeyInfo
pub fn encode_public_pkix(key: &RsaPublicKey) -> Result<Vec<u8>> {
    let inner = encode_public_pkcs1(key)?;
    Ok(encode_sequence(&[
        encode_rsa_algorithm_identifier(),
        encode_bit_string(&inner),
    ]))
}

/// Decode an X.509 SubjectPublicKeyInfo holding an RSA key
pub fn decode_public_pkix(der: &[u8]) -> Result<RsaPublicKey> {
    let mut reader = DerReader::new(der);
    let mut seq = reader.read_sequence()?;
    reader.finish()?;

    let oid = read_algorithm(&mut seq)?;
    if oid != RSA_ENCRYPTION_OID {
        debug!(algorithm = %oid_to_string(oid), "rejecting non-RSA public key");
        return Err(RsaError::Parse(format!(
            "not an RSA public key (algorithm {})",
            oid_to_string(oid)
        )));
    }

    let key_bits = seq.read_bit_string()?;
    seq.finish()?;

    decode_public_pkcs1(key_bits)
}

/// DER-encode a private key as PKCS#8 PrivateKeyInfo (RFC 5208)
pub fn encode_private_pkcs8(key: &RsaPrivateKey) -> Vec<u8> {
    encode_sequence(&[
        encode_integer(&RsaBigInt::zero()),
        encode_rsa_algorithm_identifier(),
        encode_octet_string(&encode_private_pkcs1(key)),
    ])
}

/// Decode a PKCS#8 PrivateKeyInfo holding an RSA key
pub fn decode_private_pkcs8(der: &[u8]) -> Result<RsaPrivateKey> {
    let mut reader = DerReader::new(der);
    let mut seq = reader.read_sequence()?;
    reader.finish()?;

    // v1 (0) or v2 (1, RFC 5958 OneAsymmetricKey)
    let version = seq.read_small_integer()?;
    if version > 1 {
        return Err(RsaError::Parse(format!("unsupported PKCS#8 version: {}", version)));
    }

    let oid = read_algorithm(&mut seq)?;
    if oid != RSA_ENCRYPTION_OID {
        debug!(algorithm = %oid_to_string(oid), "rejecting non-RSA PKCS#8 key");
        return Err(RsaError::KeyType(format!(
            "not an RSA private key (algorithm {})",
            oid_to_string(oid)
        )));
    }

    // Optional attributes and public key that may follow are ignored
    let inner = seq.read_octet_string()?;
    decode_private_pkcs1(inner)
}

/// Re-encode a PKCS#8 RSA private key as PKCS#1
pub fn convert_pkcs8_to_pkcs1(pkcs8: &[u8]) -> Result<Vec<u8>> {
    let key = decode_private_pkcs8(pkcs8)?;
    debug!(bits = key.bit_length(), "converted PKCS#8 private key to PKCS#1");
    Ok(encode_private_pkcs1(&key))
}

/// Re-encode a PKCS#1 RSA private key as PKCS#8
pub fn convert_pkcs1_to_pkcs8(pkcs1: &[u8]) -> Result<Vec<u8>> {
    let key = decode_private_pkcs1(pkcs1)?;
    debug!(bits = key.bit_length(), "converted PKCS#1 private key to PKCS#8");
    Ok(encode_private_pkcs8(&key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::bigint::from_u64;
    use super::super::der::{encode_tlv, tag};

    // p = 61, q = 53, e = 17, d = 2753
    fn toy_key() -> RsaPrivateKey {
        RsaPrivateKey {
            n: from_u64(3233),
            e: from_u64(17),
            d: from_u64(2753),
            crt: Some(CrtParams {
                p: from_u64(61),
                q: from_u64(53),
                d_p: from_u64(53),
                d_q: from_u64(49),
                q_inv: from_u64(38),
            }),
        }
    }

    #[test]
    fn test_pkcs1_private_roundtrip() {
        let key = toy_key();
        let der = encode_private_pkcs1(&key);
        let decoded = decode_private_pkcs1(&der).unwrap();
        assert_eq!(decoded, key);
        assert_eq!(encode_private_pkcs1(&decoded), der);
    }

    #[test]
    fn test_pkcs1_private_known_bytes() {
        let der = encode_private_pkcs1(&toy_key());
        assert_eq!(
            der,
            vec![
                0x30, 0x1d, // SEQUENCE
                0x02, 0x01, 0x00, // version
                0x02, 0x02, 0x0c, 0xa1, // n = 3233
                0x02, 0x01, 0x11, // e = 17
                0x02, 0x02, 0x0a, 0xc1, // d = 2753
                0x02, 0x01, 0x3d, // p = 61
                0x02, 0x01, 0x35, // q = 53
                0x02, 0x01, 0x35, // dP = 53
                0x02, 0x01, 0x31, // dQ = 49
                0x02, 0x01, 0x26, // qInv = 38
            ]
        );
    }

    #[test]
    fn test_pkix_roundtrip() {
        let public = toy_key().to_public_key();
        let der = encode_public_pkix(&public).unwrap();
        assert_eq!(decode_public_pkix(&der).unwrap(), public);
    }

    #[test]
    fn test_pkix_rejects_other_algorithms() {
        // id-ecPublicKey with an arbitrary BIT STRING payload
        let alg = encode_sequence(&[encode_tlv(
            tag::OID,
            &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01],
        )]);
        let der = encode_sequence(&[alg, encode_bit_string(&[0x04, 0x01, 0x02])]);

        match decode_public_pkix(&der) {
            Err(RsaError::Parse(msg)) => assert!(msg.contains("1.2.840.10045.2.1")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_pkix_rejects_private_key_bytes() {
        let der = encode_private_pkcs1(&toy_key());
        assert!(matches!(decode_public_pkix(&der), Err(RsaError::Parse(_))));
    }

    #[test]
    fn test_pkcs8_roundtrip() {
        let key = toy_key();
        let pkcs1 = encode_private_pkcs1(&key);
        let pkcs8 = convert_pkcs1_to_pkcs8(&pkcs1).unwrap();
        assert_ne!(pkcs8, pkcs1);

        let back = convert_pkcs8_to_pkcs1(&pkcs8).unwrap();
        assert_eq!(back, pkcs1);
        assert_eq!(decode_private_pkcs8(&pkcs8).unwrap(), key);
    }

    #[test]
    fn test_pkcs8_rejects_non_rsa() {
        let alg = encode_sequence(&[
            encode_tlv(tag::OID, &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01]),
            encode_tlv(tag::OID, &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07]),
        ]);
        let der = encode_sequence(&[
            encode_integer(&from_u64(0)),
            alg,
            encode_octet_string(&[0x30, 0x00]),
        ]);

        assert!(matches!(convert_pkcs8_to_pkcs1(&der), Err(RsaError::KeyType(_))));
    }

    #[test]
    fn test_pkcs1_rejects_garbage() {
        assert!(matches!(decode_private_pkcs1(&[]), Err(RsaError::Parse(_))));
        assert!(matches!(decode_private_pkcs1(b"not der"), Err(RsaError::Parse(_))));

        let mut der = encode_private_pkcs1(&toy_key());
        der.push(0x00);
        assert!(matches!(decode_private_pkcs1(&der), Err(RsaError::Parse(_))));
    }

    #[test]
    fn test_pkcs1_rejects_inconsistent_primes() {
        let mut key = toy_key();
        if let Some(crt) = key.crt.as_mut() {
            crt.p = from_u64(59);
        }
        let der = encode_private_pkcs1(&key);
        assert!(matches!(decode_private_pkcs1(&der), Err(RsaError::Parse(_))));
    }

    #[test]
    fn test_pkcs1_rejects_inconsistent_crt_values() {
        let mut key = toy_key();
        if let Some(crt) = key.crt.as_mut() {
            crt.q_inv += 1u8;
        }
        let der = encode_private_pkcs1(&key);
        assert!(matches!(decode_private_pkcs1(&der), Err(RsaError::Parse(_))));

        let mut key = toy_key();
        if let Some(crt) = key.crt.as_mut() {
            crt.d_p += 2u8;
        }
        let der = encode_private_pkcs1(&key);
        assert!(matches!(decode_private_pkcs1(&der), Err(RsaError::Parse(_))));

        let mut key = toy_key();
        if let Some(crt) = key.crt.as_mut() {
            crt.d_q = from_u64(1);
        }
        let der = encode_private_pkcs1(&key);
        assert!(matches!(decode_private_pkcs1(&der), Err(RsaError::Parse(_))));
    }

    #[test]
    fn test_pkcs1_without_primes() {
        let mut key = toy_key();
        key.crt = None;
        let der = encode_private_pkcs1(&key);
        let decoded = decode_private_pkcs1(&der).unwrap();
        assert!(decoded.crt.is_none());
        assert_eq!(decoded.d, key.d);
    }

    #[test]
    fn test_public_key_validation() {
        let bad = RsaPublicKey {
            n: from_u64(3233),
            e: from_u64(1),
        };
        let der = encode_public_pkix(&bad).unwrap();
        assert!(matches!(decode_public_pkix(&der), Err(RsaError::Parse(_))));

        let zero = RsaPublicKey {
            n: from_u64(0),
            e: from_u64(65537),
        };
        assert!(matches!(encode_public_pkix(&zero), Err(RsaError::Encoding(_))));
    }
}
