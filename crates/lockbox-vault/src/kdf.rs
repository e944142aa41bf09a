// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PBKDF2-HMAC-SHA256 key derivation from a password and a hex salt.
//!
//! Parameters are fixed (100,000 iterations, 32-byte output). Envelopes do not
//! carry them, so any implementation that encrypts or decrypts must derive the
//! exact same bytes for the same `(password, salt)`.

use std::num::NonZeroU32;

use lockbox_core::CipherError;
use ring::pbkdf2;
use zeroize::Zeroizing;

/// PBKDF2 iteration count shared by every producer and consumer of envelopes.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Salt length in bytes; 32 hex characters on the wire.
pub const SALT_LEN: usize = 16;

const ITERATIONS: NonZeroU32 = NonZeroU32::new(PBKDF2_ITERATIONS).unwrap();

/// Derive a 32-byte key from `password` and a 32-character lowercase hex salt.
///
/// Fails with [`CipherError::InvalidSalt`] before doing any work if the salt
/// is malformed. The returned key is zeroed on drop.
pub fn derive_key(password: &str, salt_hex: &str) -> Result<Zeroizing<[u8; KEY_LEN]>, CipherError> {
    let salt: [u8; SALT_LEN] = decode_lower_hex(salt_hex).map_err(CipherError::InvalidSalt)?;
    Ok(pbkdf2_sha256(password.as_bytes(), &salt, ITERATIONS))
}

fn pbkdf2_sha256(secret: &[u8], salt: &[u8], iterations: NonZeroU32) -> Zeroizing<[u8; KEY_LEN]> {
    let mut out = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        iterations,
        salt,
        secret,
        &mut out[..],
    );
    out
}

/// Decode exactly `N` bytes from lowercase hex.
///
/// Uppercase digits are rejected so that one byte string has exactly one
/// wire form.
pub(crate) fn decode_lower_hex<const N: usize>(value: &str) -> Result<[u8; N], String> {
    if value.len() != N * 2 {
        return Err(format!(
            "expected {} hex characters, got {}",
            N * 2,
            value.len()
        ));
    }
    if !is_lower_hex(value) {
        return Err("expected lowercase hex".to_string());
    }
    let mut out = [0u8; N];
    hex::decode_to_slice(value, &mut out).map_err(|e| e.to_string())?;
    Ok(out)
}

pub(crate) fn is_lower_hex(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SALT: &str = "000102030405060708090a0b0c0d0e0f";

    #[test]
    fn derive_key_produces_consistent_output() {
        let key1 = derive_key("test password", SALT).unwrap();
        let key2 = derive_key("test password", SALT).unwrap();
        assert_eq!(*key1, *key2);
    }

    #[test]
    fn derive_key_different_password_produces_different_output() {
        let key1 = derive_key("password one", SALT).unwrap();
        let key2 = derive_key("password two", SALT).unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn derive_key_different_salt_produces_different_output() {
        let key1 = derive_key("same", SALT).unwrap();
        let key2 = derive_key("same", "ffeeddccbbaa99887766554433221100").unwrap();
        assert_ne!(*key1, *key2);
    }

    #[test]
    fn pbkdf2_matches_published_sha256_vectors() {
        // PBKDF2-HMAC-SHA256, P = "password", S = "salt", dkLen = 32.
        let one = pbkdf2_sha256(b"password", b"salt", NonZeroU32::new(1).unwrap());
        assert_eq!(
            hex::encode(*one),
            "120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );

        let many = pbkdf2_sha256(b"password", b"salt", NonZeroU32::new(4096).unwrap());
        assert_eq!(
            hex::encode(*many),
            "c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a"
        );
    }

    #[test]
    fn short_salt_is_rejected() {
        let err = derive_key("pw", "0011").unwrap_err();
        assert!(matches!(err, CipherError::InvalidSalt(_)));
    }

    #[test]
    fn uppercase_salt_is_rejected() {
        let err = derive_key("pw", &SALT.to_uppercase()).unwrap_err();
        assert!(matches!(err, CipherError::InvalidSalt(_)));
    }

    #[test]
    fn non_hex_salt_is_rejected() {
        let err = derive_key("pw", "zz0102030405060708090a0b0c0d0e0f").unwrap_err();
        assert!(matches!(err, CipherError::InvalidSalt(_)));
    }
}
