// Minimal DER (Distinguished Encoding Rules) reader and writer
// Covers the subset of ASN.1 used by PKCS#1, PKCS#8 and SubjectPublicKeyInfo

use num_bigint::BigUint;
use num_traits::Zero;
use std::fmt;

use crate::error::RsaError;

/// DER parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DerError {
    /// Unexpected end of input
    UnexpectedEof,
    /// Invalid tag encountered
    InvalidTag { expected: u8, got: u8 },
    /// Invalid length encoding
    InvalidLength,
    /// Bytes left over after a complete structure
    TrailingData(usize),
    /// Unsupported or invalid data
    InvalidData(String),
}

impl fmt::Display for DerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DerError::UnexpectedEof => write!(f, "unexpected end of DER data"),
            DerError::InvalidTag { expected, got } => {
                write!(f, "invalid DER tag: expected 0x{:02x}, got 0x{:02x}", expected, got)
            }
            DerError::InvalidLength => write!(f, "invalid DER length encoding"),
            DerError::TrailingData(n) => write!(f, "{} trailing bytes after DER structure", n),
            DerError::InvalidData(msg) => write!(f, "invalid DER data: {}", msg),
        }
    }
}

impl std::error::Error for DerError {}

impl From<DerError> for RsaError {
    fn from(e: DerError) -> Self {
        RsaError::Parse(e.to_string())
    }
}

/// Result type for DER operations
pub type DerResult<T> = std::result::Result<T, DerError>;

/// ASN.1 universal tags
pub mod tag {
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OID: u8 = 0x06;
    pub const SEQUENCE: u8 = 0x30;
}

/// Content octets of OID 1.2.840.113549.1.1.1 (rsaEncryption)
pub const RSA_ENCRYPTION_OID: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];

/// DER reader with position tracking
#[derive(Debug)]
pub struct DerReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Check if all data has been consumed
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Fail unless every byte has been consumed
    pub fn finish(&self) -> DerResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DerError::TrailingData(self.data.len() - self.pos))
        }
    }

    fn read_byte(&mut self) -> DerResult<u8> {
        let byte = *self.data.get(self.pos).ok_or(DerError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, n: usize) -> DerResult<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(DerError::InvalidLength)?;
        if end > self.data.len() {
            return Err(DerError::UnexpectedEof);
        }
        let bytes = &self.data[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_length(&mut self) -> DerResult<usize> {
        let first = self.read_byte()?;

        if first < 0x80 {
            return Ok(first as usize);
        }
        // 0x80 is the BER indefinite form
        if first == 0x80 {
            return Err(DerError::InvalidLength);
        }

        let count = (first & 0x7f) as usize;
        if count > 4 {
            return Err(DerError::InvalidLength);
        }

        let mut length = 0usize;
        for &byte in self.read_bytes(count)? {
            length = (length << 8) | byte as usize;
        }

        // DER requires the shortest form
        if length < 0x80 || (count > 1 && length >> (8 * (count - 1)) == 0) {
            return Err(DerError::InvalidLength);
        }

        Ok(length)
    }

    /// Read and verify a tag, then return the contents
    pub fn read_tagged(&mut self, expected: u8) -> DerResult<&'a [u8]> {
        let got = self.read_byte()?;
        if got != expected {
            return Err(DerError::InvalidTag { expected, got });
        }
        let length = self.read_length()?;
        self.read_bytes(length)
    }

    /// Read a SEQUENCE and return a reader over its contents
    pub fn read_sequence(&mut self) -> DerResult<DerReader<'a>> {
        Ok(DerReader::new(self.read_tagged(tag::SEQUENCE)?))
    }

    /// Read a non-negative INTEGER
    pub fn read_integer(&mut self) -> DerResult<BigUint> {
        let bytes = self.read_tagged(tag::INTEGER)?;

        if bytes.is_empty() {
            return Err(DerError::InvalidData("empty INTEGER".to_string()));
        }
        if bytes[0] & 0x80 != 0 {
            return Err(DerError::InvalidData("negative INTEGER".to_string()));
        }
        if bytes.len() > 1 && bytes[0] == 0 && bytes[1] & 0x80 == 0 {
            return Err(DerError::InvalidData("non-minimal INTEGER".to_string()));
        }

        Ok(BigUint::from_bytes_be(bytes))
    }

    /// Read an INTEGER that must fit in a u32
    pub fn read_small_integer(&mut self) -> DerResult<u32> {
        let value = self.read_integer()?;
        if value.bits() > 32 {
            return Err(DerError::InvalidData("INTEGER too large".to_string()));
        }
        Ok(value.to_u32_digits().first().copied().unwrap_or(0))
    }

    pub fn read_octet_string(&mut self) -> DerResult<&'a [u8]> {
        self.read_tagged(tag::OCTET_STRING)
    }

    /// Read a BIT STRING holding whole bytes
    pub fn read_bit_string(&mut self) -> DerResult<&'a [u8]> {
        let contents = self.read_tagged(tag::BIT_STRING)?;
        match contents.split_first() {
            Some((0, rest)) => Ok(rest),
            Some((unused, _)) => Err(DerError::InvalidData(format!(
                "BIT STRING with {} unused bits",
                unused
            ))),
            None => Err(DerError::InvalidData("empty BIT STRING".to_string())),
        }
    }

    /// Read an OBJECT IDENTIFIER, returning its content octets
    pub fn read_oid(&mut self) -> DerResult<&'a [u8]> {
        let bytes = self.read_tagged(tag::OID)?;
        if bytes.is_empty() || bytes[bytes.len() - 1] & 0x80 != 0 {
            return Err(DerError::InvalidData("malformed OID".to_string()));
        }
        Ok(bytes)
    }

    pub fn read_null(&mut self) -> DerResult<()> {
        if !self.read_tagged(tag::NULL)?.is_empty() {
            return Err(DerError::InvalidData("NULL must be empty".to_string()));
        }
        Ok(())
    }
}

/// Render OID content octets in dotted form, for error messages
pub fn oid_to_string(bytes: &[u8]) -> String {
    let mut components: Vec<u64> = Vec::new();
    let mut value = 0u64;

    for &byte in bytes {
        value = (value << 7) | (byte & 0x7f) as u64;
        if byte & 0x80 == 0 {
            if components.is_empty() {
                let first = value.min(80) / 40;
                components.push(first);
                components.push(value - first * 40);
            } else {
                components.push(value);
            }
            value = 0;
        }
    }

    components
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

fn write_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
        return;
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
}

/// Encode a single tag-length-value element
pub fn encode_tlv(tag: u8, contents: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(contents.len() + 6);
    out.push(tag);
    write_length(&mut out, contents.len());
    out.extend_from_slice(contents);
    out
}

/// Encode a non-negative INTEGER
pub fn encode_integer(n: &BigUint) -> Vec<u8> {
    let mut contents = if n.is_zero() { vec![0u8] } else { n.to_bytes_be() };
    if contents[0] & 0x80 != 0 {
        contents.insert(0, 0x00);
    }
    encode_tlv(tag::INTEGER, &contents)
}

/// Encode a SEQUENCE from already-encoded elements
pub fn encode_sequence(elements: &[Vec<u8>]) -> Vec<u8> {
    encode_tlv(tag::SEQUENCE, &elements.concat())
}

pub fn encode_octet_string(bytes: &[u8]) -> Vec<u8> {
    encode_tlv(tag::OCTET_STRING, bytes)
}

/// Encode a BIT STRING of whole bytes
pub fn encode_bit_string(bytes: &[u8]) -> Vec<u8> {
    let mut contents = Vec::with_capacity(bytes.len() + 1);
    contents.push(0x00);
    contents.extend_from_slice(bytes);
    encode_tlv(tag::BIT_STRING, &contents)
}

/// AlgorithmIdentifier { rsaEncryption, NULL }
pub fn encode_rsa_algorithm_identifier() -> Vec<u8> {
    encode_sequence(&[
        encode_tlv(tag::OID, RSA_ENCRYPTION_OID),
        encode_tlv(tag::NULL, &[]),
    ])
}
