// C ABI
// Result structs and exported entry points for linking from C (see include/secure_rsa.h)
//
// Every input buffer is borrowed for the duration of the call. Every non-null
// pointer in a returned struct is owned by the caller and must be released
// exactly once with the matching rsa_free_* function. A NULL `error` field
// means success.

#![allow(clippy::missing_safety_doc)]

use std::ffi::{c_char, c_int, CStr, CString};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::slice;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::error;

use crate::error::{Result, RsaError};
use crate::rsa::{self, DigestAlgorithm, KeyPair};

/// Byte buffer result
#[repr(C)]
#[derive(Debug)]
pub struct ByteArray {
    pub data: *mut u8,
    pub length: c_int,
    pub error: *mut c_char,
}

/// Generated key pair: SubjectPublicKeyInfo and PKCS#1 DER
#[repr(C)]
#[derive(Debug)]
pub struct RsaKeyPair {
    pub public_key: ByteArray,
    pub private_key: ByteArray,
    pub error: *mut c_char,
}

/// NUL-terminated string result
#[repr(C)]
#[derive(Debug)]
pub struct StringResult {
    pub data: *mut c_char,
    pub error: *mut c_char,
}

/// Boolean result, `success` is 1 for true and 0 for false
#[repr(C)]
#[derive(Debug)]
pub struct BoolResult {
    pub success: c_int,
    pub error: *mut c_char,
}

fn error_string(err: &RsaError) -> *mut c_char {
    // Messages never contain NUL, but a CString must not either
    let message = err.to_string().replace('\0', " ");
    CString::new(message)
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}

impl ByteArray {
    fn empty() -> Self {
        Self {
            data: ptr::null_mut(),
            length: 0,
            error: ptr::null_mut(),
        }
    }

    fn from_error(err: &RsaError) -> Self {
        Self {
            error: error_string(err),
            ..Self::empty()
        }
    }

    fn from_bytes(bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            return Self::empty();
        }
        let length = match c_int::try_from(bytes.len()) {
            Ok(length) => length,
            Err(_) => {
                return Self::from_error(&RsaError::Encoding(format!(
                    "output of {} bytes does not fit a C int length",
                    bytes.len()
                )))
            }
        };
        let data = Box::into_raw(bytes.into_boxed_slice()) as *mut u8;
        Self {
            data,
            length,
            error: ptr::null_mut(),
        }
    }

    fn from_result(result: Result<Vec<u8>>) -> Self {
        match result {
            Ok(bytes) => Self::from_bytes(bytes),
            Err(e) => Self::from_error(&e),
        }
    }

    unsafe fn release(&mut self) {
        if !self.data.is_null() && self.length > 0 {
            let slice = ptr::slice_from_raw_parts_mut(self.data, self.length as usize);
            drop(Box::from_raw(slice));
        }
        self.data = ptr::null_mut();
        self.length = 0;
        release_string(&mut self.error);
    }
}

impl RsaKeyPair {
    fn from_result(result: Result<KeyPair>) -> Self {
        match result {
            Ok(pair) => Self {
                public_key: ByteArray::from_bytes(pair.public_key),
                private_key: ByteArray::from_bytes(pair.private_key),
                error: ptr::null_mut(),
            },
            Err(e) => Self {
                public_key: ByteArray::empty(),
                private_key: ByteArray::empty(),
                error: error_string(&e),
            },
        }
    }
}

impl StringResult {
    fn from_result(result: Result<String>) -> Self {
        let text = result.and_then(|text| {
            CString::new(text).map_err(|_| RsaError::Encoding("output contains NUL".to_string()))
        });
        match text {
            Ok(text) => Self {
                data: text.into_raw(),
                error: ptr::null_mut(),
            },
            Err(e) => Self {
                data: ptr::null_mut(),
                error: error_string(&e),
            },
        }
    }
}

impl BoolResult {
    fn from_result(result: Result<bool>) -> Self {
        match result {
            Ok(value) => Self {
                success: c_int::from(value),
                error: ptr::null_mut(),
            },
            Err(e) => Self {
                success: 0,
                error: error_string(&e),
            },
        }
    }
}

unsafe fn release_string(text: &mut *mut c_char) {
    if !text.is_null() {
        drop(CString::from_raw(*text));
        *text = ptr::null_mut();
    }
}

/// Borrow a caller buffer
unsafe fn input_bytes<'a>(data: *const u8, length: c_int) -> Result<&'a [u8]> {
    if length < 0 {
        return Err(RsaError::Encoding(format!("negative buffer length: {}", length)));
    }
    if length == 0 {
        return Ok(&[]);
    }
    if data.is_null() {
        return Err(RsaError::Encoding(
            "null buffer with non-zero length".to_string(),
        ));
    }
    Ok(slice::from_raw_parts(data, length as usize))
}

/// Borrow a caller NUL-terminated UTF-8 string
unsafe fn input_str<'a>(text: *const c_char) -> Result<&'a str> {
    if text.is_null() {
        return Err(RsaError::Encoding("null string".to_string()));
    }
    CStr::from_ptr(text)
        .to_str()
        .map_err(|_| RsaError::Encoding("string is not valid UTF-8".to_string()))
}

/// Run `operation`, turning a panic into an `Internal` error
fn guarded<T>(operation: impl FnOnce() -> Result<T>) -> Result<T> {
    panic::catch_unwind(AssertUnwindSafe(operation)).unwrap_or_else(|_| {
        error!("panic caught at the C boundary");
        Err(RsaError::Internal("operation panicked".to_string()))
    })
}

fn key_size(bits: c_int) -> Result<usize> {
    usize::try_from(bits).map_err(|_| RsaError::Generation(format!("invalid key size: {}", bits)))
}

#[no_mangle]
pub extern "C" fn rsa_gen_key_pair(bits: c_int) -> RsaKeyPair {
    RsaKeyPair::from_result(guarded(|| rsa::generate_keypair(key_size(bits)?)))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_extract_public_key(
    private_key: *const u8,
    private_key_len: c_int,
) -> ByteArray {
    ByteArray::from_result(guarded(|| {
        rsa::extract_public_key(input_bytes(private_key, private_key_len)?)
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_get_public_key_base64(
    public_key: *const u8,
    public_key_len: c_int,
) -> StringResult {
    StringResult::from_result(guarded(|| {
        let public_key = input_bytes(public_key, public_key_len)?;
        Ok(BASE64.encode(public_key))
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_get_private_key_base64(
    private_key: *const u8,
    private_key_len: c_int,
) -> StringResult {
    StringResult::from_result(guarded(|| {
        let private_key = input_bytes(private_key, private_key_len)?;
        Ok(BASE64.encode(private_key))
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_encrypt(
    data: *const u8,
    data_len: c_int,
    public_key: *const u8,
    public_key_len: c_int,
) -> ByteArray {
    ByteArray::from_result(guarded(|| {
        rsa::encrypt(
            input_bytes(data, data_len)?,
            input_bytes(public_key, public_key_len)?,
        )
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_encrypt_base64(
    data: *const u8,
    data_len: c_int,
    public_key: *const u8,
    public_key_len: c_int,
) -> StringResult {
    StringResult::from_result(guarded(|| {
        rsa::encrypt_base64(
            input_bytes(data, data_len)?,
            input_bytes(public_key, public_key_len)?,
        )
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_decrypt(
    encrypted: *const u8,
    encrypted_len: c_int,
    private_key: *const u8,
    private_key_len: c_int,
) -> ByteArray {
    ByteArray::from_result(guarded(|| {
        rsa::decrypt(
            input_bytes(encrypted, encrypted_len)?,
            input_bytes(private_key, private_key_len)?,
        )
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_decrypt_from_base64(
    encrypted_base64: *const c_char,
    private_key: *const u8,
    private_key_len: c_int,
) -> ByteArray {
    ByteArray::from_result(guarded(|| {
        rsa::decrypt_from_base64(
            input_str(encrypted_base64)?,
            input_bytes(private_key, private_key_len)?,
        )
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_sign(
    data: *const u8,
    data_len: c_int,
    private_key: *const u8,
    private_key_len: c_int,
) -> ByteArray {
    ByteArray::from_result(guarded(|| {
        rsa::sign(
            input_bytes(data, data_len)?,
            input_bytes(private_key, private_key_len)?,
            DigestAlgorithm::Sha256,
        )
    }))
}

/// Sign a NUL-terminated string with SHA-256, returning base64
#[no_mangle]
pub unsafe extern "C" fn rsa_sign_base64(
    data: *const c_char,
    private_key: *const u8,
    private_key_len: c_int,
) -> StringResult {
    StringResult::from_result(guarded(|| {
        rsa::sign_base64(
            input_str(data)?.as_bytes(),
            input_bytes(private_key, private_key_len)?,
            DigestAlgorithm::Sha256,
        )
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_sign_sha1(
    data: *const u8,
    data_len: c_int,
    private_key: *const u8,
    private_key_len: c_int,
) -> ByteArray {
    ByteArray::from_result(guarded(|| {
        rsa::sign_sha1(
            input_bytes(data, data_len)?,
            input_bytes(private_key, private_key_len)?,
        )
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_verify(
    data: *const u8,
    data_len: c_int,
    public_key: *const u8,
    public_key_len: c_int,
    signature: *const u8,
    signature_len: c_int,
) -> BoolResult {
    BoolResult::from_result(guarded(|| {
        rsa::verify(
            input_bytes(data, data_len)?,
            input_bytes(public_key, public_key_len)?,
            input_bytes(signature, signature_len)?,
            DigestAlgorithm::Sha256,
        )
    }))
}

/// Verify a base64 SHA-256 signature over a NUL-terminated string
#[no_mangle]
pub unsafe extern "C" fn rsa_verify_from_base64(
    data: *const c_char,
    public_key: *const u8,
    public_key_len: c_int,
    signature_base64: *const c_char,
) -> BoolResult {
    BoolResult::from_result(guarded(|| {
        rsa::verify_from_base64(
            input_str(data)?.as_bytes(),
            input_bytes(public_key, public_key_len)?,
            input_str(signature_base64)?,
            DigestAlgorithm::Sha256,
        )
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_verify_sha1(
    data: *const u8,
    data_len: c_int,
    public_key: *const u8,
    public_key_len: c_int,
    signature: *const u8,
    signature_len: c_int,
) -> BoolResult {
    BoolResult::from_result(guarded(|| {
        rsa::verify_sha1(
            input_bytes(data, data_len)?,
            input_bytes(public_key, public_key_len)?,
            input_bytes(signature, signature_len)?,
        )
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_convert_pkcs8_to_pkcs1(
    private_key: *const u8,
    private_key_len: c_int,
) -> ByteArray {
    ByteArray::from_result(guarded(|| {
        rsa::convert_pkcs8_to_pkcs1(input_bytes(private_key, private_key_len)?)
    }))
}

#[no_mangle]
pub unsafe extern "C" fn rsa_convert_pkcs1_to_pkcs8(
    private_key: *const u8,
    private_key_len: c_int,
) -> ByteArray {
    ByteArray::from_result(guarded(|| {
        rsa::convert_pkcs1_to_pkcs8(input_bytes(private_key, private_key_len)?)
    }))
}

// Legacy entry points kept under their original symbol names. Key arguments
// come first and key generation returns only the PKCS#1 private key.

#[export_name = "goGenerateRSAKeyPair"]
pub extern "C" fn legacy_generate_private_key(bits: c_int) -> ByteArray {
    ByteArray::from_result(guarded(|| {
        rsa::generate_keypair(key_size(bits)?).map(|pair| pair.private_key)
    }))
}

#[export_name = "goRSAEncrypt"]
pub unsafe extern "C" fn legacy_encrypt(
    public_key: *const u8,
    public_key_len: c_int,
    data: *const u8,
    data_len: c_int,
) -> ByteArray {
    rsa_encrypt(data, data_len, public_key, public_key_len)
}

#[export_name = "goRSADecrypt"]
pub unsafe extern "C" fn legacy_decrypt(
    private_key: *const u8,
    private_key_len: c_int,
    encrypted: *const u8,
    encrypted_len: c_int,
) -> ByteArray {
    rsa_decrypt(encrypted, encrypted_len, private_key, private_key_len)
}

#[no_mangle]
pub unsafe extern "C" fn rsa_free_byte_array(mut result: ByteArray) {
    result.release();
}

#[no_mangle]
pub unsafe extern "C" fn rsa_free_key_pair(mut result: RsaKeyPair) {
    result.public_key.release();
    result.private_key.release();
    release_string(&mut result.error);
}

#[no_mangle]
pub unsafe extern "C" fn rsa_free_string_result(mut result: StringResult) {
    release_string(&mut result.data);
    release_string(&mut result.error);
}

#[no_mangle]
pub unsafe extern "C" fn rsa_free_bool_result(mut result: BoolResult) {
    release_string(&mut result.error);
}
