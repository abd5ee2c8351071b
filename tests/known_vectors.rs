// Known-answer vectors shared with other RSA implementations

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use secure_rsa::rsa::{
    convert_pkcs1_to_pkcs8, convert_pkcs8_to_pkcs1, decode_private_pkcs1, decode_private_pkcs8,
    decode_public_pkix, decrypt, decrypt_from_base64, encode_public_pkix, extract_public_key,
    sign, sign_sha1, verify, verify_from_base64, verify_sha1,
};
use secure_rsa::DigestAlgorithm;

/// SubjectPublicKeyInfo matching `PKCS8_PRIVATE_KEY`
const PKCS8_PUBLIC_KEY: &str = concat!(
    "MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQCLjXCd0y8wucMlQDd9S9cFeCA0H/l/prnouwWg",
    "GOEzoaS1gBK4IK0AAiNd7mz8EP+4m9DqeaGW63ei3aws43qV1lDpsVepfJ2PPe/5VBx7uAKKGqPU",
    "+IlNP6EBWUWMMsrCS/oh6LHucCyLah5YhyXOju1cZTfqQ1VFWsbZupmUaQIDAQAB",
);

/// 1024-bit PKCS#8 private key produced by another RSA implementation
const PKCS8_PRIVATE_KEY: &str = concat!(
    "MIICdwIBADANBgkqhkiG9w0BAQEFAASCAmEwggJdAgEAAoGBAIuNcJ3TLzC5wyVAN31L1wV4IDQf",
    "+X+muei7BaAY4TOhpLWAErggrQACI13ubPwQ/7ib0Op5oZbrd6LdrCzjepXWUOmxV6l8nY897/lU",
    "HHu4Aooao9T4iU0/oQFZRYwyysJL+iHose5wLItqHliHJc6O7VxlN+pDVUVaxtm6mZRpAgMBAAEC",
    "gYAKHDkodgBZO1wT+s8KWNA/KTDMFfTxdpbJcaM6shK+tttD+v9gL53Y/k6po3hp2qFsMn20PxOh",
    "53VHa1/p8KEU1j+DwLbNC5eIp7/5ZNWwftQTSHBCqSyr+7rE0i6Gcst1qT0ioKUS1fOHIZSt0gfB",
    "Of1eEzhpLDT1o0QgY98cAQJBANrWFNml89xHZQAUmXvrcC/vzmbfktWuHpTP4gRoURp4Uh7j07xD",
    "7dVN/gbk42K70VWCTWTRSARApA9IfjACuqECQQCjQH4hh/2H70b23h3OUfiGUSnhupoNUz93xTsa",
    "BYbwiTGYH81Sno5aQbO3j8H9gi8qZanSHRG24MUVeyQdRYzJAkBHJ0aeQgxZeklHzmrdVP8kRwfI",
    "gTdgDP5aioFFx5lfTvH8oz1MQJYLPhGzsiaRCtqUwApkFnwhDdeKNJr7B1ghAkEAm/knSTQbp/+V",
    "xpGK2q/4iaQMJs3ZF7gc4HrBL+ht92ysxJJF4pT4nwU9BrlD98ik9ZXyPXxmi1qPEin35Dup+QJB",
    "AMQsiQwjjTGoVJpNrXoxHbSwgrHhJrgP4HUX2XKmbjCfem8dWdU93G4/VDFUDcNJyd33xDOHispM",
    "oe+rHwgG0xQ=",
);

const PKCS1_PUBLIC_KEY: &str = concat!(
    "MIGfMA0GCSqGSIb3DQEBAQUAA4GNADCBiQKBgQCCjpncvOtMHIp4Bv9sX3JMoSlYKCWsaHdDZ5Oi",
    "+QybEDQQlk+MS0wDv+CodsbBFkFwkYcScJzXO/2tM7zVLJR71H761u/woIC5WiBivEMfF6paD0oU",
    "M/M440N6ek9ZVONd+W29tnsA+pRVPhN8JhIJaWpuB//UoROXp0PWMjfiZwIDAQAB",
);

/// 1024-bit PKCS#1 private key produced by another RSA implementation
const PKCS1_PRIVATE_KEY: &str = concat!(
    "MIICXAIBAAKBgQCCjpncvOtMHIp4Bv9sX3JMoSlYKCWsaHdDZ5Oi+QybEDQQlk+MS0wDv+CodsbB",
    "FkFwkYcScJzXO/2tM7zVLJR71H761u/woIC5WiBivEMfF6paD0oUM/M440N6ek9ZVONd+W29tnsA",
    "+pRVPhN8JhIJaWpuB//UoROXp0PWMjfiZwIDAQABAoGAd/oYBzRNfzpTPY4guDTWUvlfhzYNuOyf",
    "fP/4OrJoFS/EyOF45NJlXqS8DdRpPhP3uzzhRd7bIyhsLPj4tWYsZGuyA+GyOjF9Zj/rOWPU1rP4",
    "qWSFQ1p9pHvugoi3yt9I1bIqggvUcXk3hdnuVdfSjQE1fY5lpXZvGKB6zNpqZVECQQDuWimYnFgc",
    "/1BJtSfCwtKiN0eFMw8S4gTyzWttwOtFxBsHo7Q1l5Xvk564kwZXr2CuOXahrJaDjYm7vNzfoy6b",
    "AkEAjDk9QynP8YXQsISPB/X/PxYYpZbAti85sk3JPVO2jb3tAkxCYmIxUg1xgpogaOupqKxeQe83",
    "gD8742+5xSXSJQJASuFegghUEkAPjChyZlhobffp6ynASZFiNplcb62U/GUAjOTcH54Qx6Rbz+a4",
    "rmF1gSaiY2ZiHtAffjB2P3f3kwJASBx7k9mh1ZwyeUSCZd6tOB096ZJAYrCgpEB6eC5f2D7O7vqW",
    "vQ+wO3ksYbSvbCWdZ1/VTWUfDrX2L31adLeBfQJBALGYWVO6Ksv72k1vbSywhLYOKVe3JLZiZgFU",
    "NvKLh0g1Tfm1pK29veSSGey8HIkGtI04E6tgQVLx3adZSxjdnFI=",
);

const CONTENT: &str = "kolOt/LYqkhf/RZu6aJcIA==";

/// `CONTENT` encrypted under `PKCS1_PUBLIC_KEY`
const CIPHERTEXT: &str = concat!(
    "a6CIZzAPpzaDysCOE9X5FYp723lsTRia/GVDmU4yyhcKaFX2iBICfVwK5gakKK+NgTQ4veMu0l3w",
    "pIHM+eRA+Q6zrxCYjE8tkH1O4Jbxcvx4Nai4QP0JqCXDXNpxJMccKhqyNZ01uBq1RjJ++ATkMt66",
    "rt5DMW4pLtToh7nLjhg=",
);

/// SHA-256 signature of `CONTENT` under `PKCS8_PRIVATE_KEY`
const SIGNATURE_SHA256: &str = concat!(
    "VnEka0wYeYmaG45qW7+RTPH+prTO9ryxrtqyAwpoZOymeQGJTPfkmm+Ti16UJPZetYR1LF+ETQ++",
    "XAkuTQIqhu4sgXyuhw4/TIYyMDzaEuEDOciwvJLiyC73E0Q4jXQx6kT8o+65Ki9h4LPxjjr8tOc+",
    "/r3U1uhute8/QWWYiuA=",
);

/// SHA-1 signature of `CONTENT` under `PKCS1_PRIVATE_KEY`
const SIGNATURE_SHA1: &str = concat!(
    "RvxmCkUxhtSPLss712C2vH7jpXaV82QXDe/e9EaclgWuVPEliDPmUkwg20PfG5d/xM0l3LAEexHA",
    "UWD3svg6HTWo9zw7/l+fYxtkbv59i8Uz7r5Y+j3HVaHKevFEw2Z34PHbiPXVNYBRE/4Qzl8wLT2Z",
    "SLzo50yBBFziD4LgvtU=",
);
fn decode(value: &str) -> Vec<u8> {
    BASE64.decode(value).unwrap()
}

#[test]
fn pkcs8_key_converts_to_pkcs1() {
    let pkcs8 = decode(PKCS8_PRIVATE_KEY);
    let pkcs1 = convert_pkcs8_to_pkcs1(&pkcs8).unwrap();
    assert_eq!(pkcs1.len(), 609);

    let key = decode_private_pkcs1(&pkcs1).unwrap();
    assert_eq!(key, decode_private_pkcs8(&pkcs8).unwrap());
    assert_eq!(key.n.bits(), 1024);

    // Re-wrapping reproduces the envelope byte for byte
    assert_eq!(convert_pkcs1_to_pkcs8(&pkcs1).unwrap(), pkcs8);
}

#[test]
fn public_keys_reencode_identically() {
    for public_key in [decode(PKCS8_PUBLIC_KEY), decode(PKCS1_PUBLIC_KEY)] {
        let key = decode_public_pkix(&public_key).unwrap();
        assert_eq!(key.n.bits(), 1024);
        assert_eq!(encode_public_pkix(&key).unwrap(), public_key);
    }
}

#[test]
fn decrypts_foreign_ciphertext() {
    let private_key = decode(PKCS1_PRIVATE_KEY);
    let plaintext = decrypt(&decode(CIPHERTEXT), &private_key).unwrap();
    assert_eq!(plaintext, decode(CONTENT));

    let plaintext = decrypt_from_base64(CIPHERTEXT, &private_key).unwrap();
    assert_eq!(plaintext, decode(CONTENT));
}

#[test]
fn verifies_foreign_signatures() {
    let content = decode(CONTENT);

    assert_eq!(
        verify(
            &content,
            &decode(PKCS8_PUBLIC_KEY),
            &decode(SIGNATURE_SHA256),
            DigestAlgorithm::Sha256
        ),
        Ok(true)
    );
    assert_eq!(
        verify_from_base64(
            &content,
            &decode(PKCS8_PUBLIC_KEY),
            SIGNATURE_SHA256,
            DigestAlgorithm::Sha256
        ),
        Ok(true)
    );
    assert_eq!(
        verify_sha1(&content, &decode(PKCS1_PUBLIC_KEY), &decode(SIGNATURE_SHA1)),
        Ok(true)
    );

    // Signatures are bound to their key and digest
    assert_eq!(
        verify(
            &content,
            &decode(PKCS1_PUBLIC_KEY),
            &decode(SIGNATURE_SHA256),
            DigestAlgorithm::Sha256
        ),
        Ok(false)
    );
    assert_eq!(
        verify(
            &content,
            &decode(PKCS1_PUBLIC_KEY),
            &decode(SIGNATURE_SHA1),
            DigestAlgorithm::Sha256
        ),
        Ok(false)
    );
}

#[test]
fn resigning_reproduces_foreign_signatures() {
    let content = decode(CONTENT);

    let pkcs1 = convert_pkcs8_to_pkcs1(&decode(PKCS8_PRIVATE_KEY)).unwrap();
    let signature = sign(&content, &pkcs1, DigestAlgorithm::Sha256).unwrap();
    assert_eq!(signature, decode(SIGNATURE_SHA256));

    let signature = sign_sha1(&content, &decode(PKCS1_PRIVATE_KEY)).unwrap();
    assert_eq!(signature, decode(SIGNATURE_SHA1));
}

#[test]
fn extracted_public_keys_match() {
    let extracted = extract_public_key(&decode(PKCS1_PRIVATE_KEY)).unwrap();
    assert_eq!(extracted, decode(PKCS1_PUBLIC_KEY));

    let pkcs1 = convert_pkcs8_to_pkcs1(&decode(PKCS8_PRIVATE_KEY)).unwrap();
    assert_eq!(extract_public_key(&pkcs1).unwrap(), decode(PKCS8_PUBLIC_KEY));
}
