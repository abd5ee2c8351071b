// PKCS#1 v1.5 Padding
// Implements RSA PKCS#1 v1.5 padding for encryption (EME) and signatures (EMSA)

use rand::{CryptoRng, Rng, RngCore};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, ConstantTimeGreater};
use zeroize::Zeroizing;

use crate::error::{Result, RsaError};

/// 0x00 || 0x02 || PS (at least 8 bytes) || 0x00
pub const PADDING_OVERHEAD: usize = 11;

/// Largest plaintext that fits a modulus of `k` bytes
pub fn max_payload_len(k: usize) -> usize {
    k.saturating_sub(PADDING_OVERHEAD)
}

/// Fill `buf` with random bytes in 0x01..=0xFF
fn non_zero_random_bytes<R: RngCore + CryptoRng + ?Sized>(rng: &mut R, buf: &mut [u8]) {
    rng.fill_bytes(buf);
    for byte in buf.iter_mut() {
        while *byte == 0 {
            *byte = rng.gen();
        }
    }
}

/// PKCS#1 v1.5 padding for encryption
/// Format: 0x00 || 0x02 || PS || 0x00 || data, exactly `k` bytes
/// PS = padding string of non-zero random bytes (at least 8 bytes)
pub fn pad_pkcs1_v15<R: RngCore + CryptoRng + ?Sized>(
    rng: &mut R,
    data: &[u8],
    k: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    if k < PADDING_OVERHEAD || data.len() > k - PADDING_OVERHEAD {
        return Err(RsaError::PayloadTooLarge {
            max: max_payload_len(k),
            actual: data.len(),
        });
    }

    let separator = k - data.len() - 1;
    let mut em = Zeroizing::new(vec![0u8; k]);
    em[1] = 0x02;
    non_zero_random_bytes(rng, &mut em[2..separator]);
    em[separator] = 0x00;
    em[separator + 1..].copy_from_slice(data);

    Ok(em)
}

/// Remove PKCS#1 v1.5 encryption padding from a `k`-byte block.
///
/// The structure is checked without data-dependent branches and every
/// failure is reported as the same opaque `RsaError::Padding`.
pub fn unpad_pkcs1_v15(em: &[u8], k: usize) -> Result<Vec<u8>> {
    if k < PADDING_OVERHEAD || em.len() != k {
        return Err(RsaError::Padding);
    }

    let first_byte_is_zero = em[0].ct_eq(&0u8);
    let second_byte_is_two = em[1].ct_eq(&2u8);

    // Index of the first zero byte after the header
    let mut looking_for_index = Choice::from(1u8);
    let mut index = 0u32;
    for (i, byte) in em.iter().enumerate().skip(2) {
        let is_zero = byte.ct_eq(&0u8);
        index.conditional_assign(&(i as u32), looking_for_index & is_zero);
        looking_for_index &= !is_zero;
    }

    // PS spans em[2..index] and must be at least 8 bytes
    let valid_ps = index.ct_gt(&9u32);
    let valid = first_byte_is_zero & second_byte_is_two & !looking_for_index & valid_ps;

    if !bool::from(valid) {
        return Err(RsaError::Padding);
    }

    Ok(em[index as usize + 1..].to_vec())
}

/// PKCS#1 v1.5 signature padding (EMSA-PKCS1-v1_5)
/// Format: 0x00 || 0x01 || PS (0xFF) || 0x00 || DigestInfo prefix || digest
pub fn pad_for_signature(hashed: &[u8], digest_info_prefix: &[u8], k: usize) -> Result<Vec<u8>> {
    let t_len = digest_info_prefix.len() + hashed.len();
    if k < t_len + PADDING_OVERHEAD {
        return Err(RsaError::PayloadTooLarge {
            max: max_payload_len(k),
            actual: t_len,
        });
    }

    let mut em = vec![0xffu8; k];
    em[0] = 0x00;
    em[1] = 0x01;
    em[k - t_len - 1] = 0x00;
    em[k - t_len..k - hashed.len()].copy_from_slice(digest_info_prefix);
    em[k - hashed.len()..].copy_from_slice(hashed);

    Ok(em)
}
