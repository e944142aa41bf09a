// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope format and cipher properties, checked through the public API.

use std::sync::Arc;

use lockbox_core::{CipherError, Envelope};
use lockbox_vault::{CombinedTagProvider, DetachedTagProvider, EnvelopeCipher};
use proptest::prelude::*;

fn detached() -> EnvelopeCipher {
    EnvelopeCipher::new(Arc::new(DetachedTagProvider))
}

fn combined() -> EnvelopeCipher {
    EnvelopeCipher::new(Arc::new(CombinedTagProvider))
}

fn flip_hex_bit(field: &str, bit: usize) -> String {
    let mut bytes = hex::decode(field).unwrap();
    let idx = (bit / 8) % bytes.len();
    bytes[idx] ^= 1 << (bit % 8);
    hex::encode(bytes)
}

#[test]
fn concrete_example() {
    let cipher = detached();
    let envelope = cipher.encrypt("Sup3r$ecret!", "hunter2").unwrap();

    assert_eq!(envelope.iv.len(), 32);
    assert_eq!(envelope.salt.len(), 32);
    assert_eq!(envelope.tag.len(), 32);
    assert_eq!(envelope.algorithm, "aes-256-gcm");
    assert_eq!(cipher.decrypt(&envelope, "hunter2").unwrap().as_str(), "Sup3r$ecret!");
    assert_eq!(
        cipher.decrypt(&envelope, "wrong").unwrap_err(),
        CipherError::AuthenticationFailure
    );
}

#[test]
fn encryption_is_fresh_every_time() {
    let cipher = detached();
    let a = cipher.encrypt("same", "same").unwrap();
    let b = cipher.encrypt("same", "same").unwrap();
    assert_ne!(a.salt, b.salt);
    assert_ne!(a.iv, b.iv);
    assert_ne!(a.ciphertext, b.ciphertext);
}

#[test]
fn envelopes_cross_backends_via_json() {
    let from_detached = detached().encrypt("made on one platform", "pw").unwrap();
    let from_combined = combined().encrypt("made on another", "pw").unwrap();

    let stored = from_detached.to_json();
    let loaded = Envelope::from_json(&stored).unwrap();
    assert_eq!(combined().decrypt(&loaded, "pw").unwrap().as_str(), "made on one platform");

    let stored = from_combined.to_json();
    let loaded = Envelope::from_json(&stored).unwrap();
    assert_eq!(detached().decrypt(&loaded, "pw").unwrap().as_str(), "made on another");
}

/// Produced by Node's `crypto.createCipheriv('aes-256-gcm', key, iv)` with a
/// 16-byte IV and a PBKDF2-SHA256 key (100 000 iterations).
const NODE_ENVELOPE: &str = concat!(
    r#"{"ciphertext":"9af7ffb7a6d9a3dc4f650098f7781c7046ba","#,
    r#""iv":"cef34ce28b16791f7b884f909b1fe52b","#,
    r#""salt":"868a79d325cbe7f06d009e785802d7eb","#,
    r#""tag":"292c036c6dd85bff3ed61b4754e2a3f8","#,
    r#""algorithm":"aes-256-gcm"}"#
);

#[test]
fn decrypts_envelope_made_by_node() {
    let envelope = Envelope::from_json(NODE_ENVELOPE).unwrap();
    for cipher in [detached(), combined()] {
        let plaintext = cipher.decrypt(&envelope, "hunter2").unwrap();
        assert_eq!(plaintext.as_str(), "Sup3r$ecret! \u{fc}n\u{ef}");
        assert_eq!(
            cipher.decrypt(&envelope, "hunter3").unwrap_err(),
            CipherError::AuthenticationFailure
        );
    }
}

#[test]
fn stored_json_with_missing_tag_is_shape_error() {
    let envelope = detached().encrypt("x", "pw").unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&envelope.to_json()).unwrap();
    value.as_object_mut().unwrap().remove("tag");

    let err = Envelope::from_json(&value.to_string()).unwrap_err();
    assert!(err.is_shape_error());
}

#[test]
fn every_param_field_must_be_32_hex_chars() {
    let cipher = detached();
    let good = cipher.encrypt("x", "pw").unwrap();
    let broken = [
        Envelope { iv: good.iv[..30].to_string(), ..good.clone() },
        Envelope { iv: format!("{}00", good.iv), ..good.clone() },
        Envelope { salt: good.salt[..30].to_string(), ..good.clone() },
        Envelope { tag: good.tag[..30].to_string(), ..good.clone() },
        Envelope { tag: "zz".repeat(16), ..good.clone() },
        Envelope { algorithm: "AES-256-GCM".into(), ..good.clone() },
    ];
    for envelope in broken {
        let err = cipher.decrypt(&envelope, "pw").unwrap_err();
        assert!(err.is_shape_error(), "expected shape error, got {err}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn roundtrip(plaintext in ".{0,64}", password in ".{1,32}") {
        let cipher = detached();
        let envelope = cipher.encrypt(&plaintext, &password).unwrap();
        prop_assert_eq!(envelope.ciphertext.len(), plaintext.len() * 2);
        let decrypted = cipher.decrypt(&envelope, &password).unwrap();
        prop_assert_eq!(decrypted.as_str(), plaintext.as_str());
    }

    #[test]
    fn wrong_password_is_rejected(password in "[a-z]{1,16}") {
        let cipher = combined();
        let envelope = cipher.encrypt("payload", &password).unwrap();
        let other = format!("{password}!");
        prop_assert_eq!(
            cipher.decrypt(&envelope, &other).unwrap_err(),
            CipherError::AuthenticationFailure
        );
    }

    #[test]
    fn tampered_ciphertext_is_rejected(bit in 0usize..256) {
        let cipher = detached();
        let mut envelope = cipher.encrypt("tamper target", "pw").unwrap();
        envelope.ciphertext = flip_hex_bit(&envelope.ciphertext, bit);
        prop_assert_eq!(
            cipher.decrypt(&envelope, "pw").unwrap_err(),
            CipherError::AuthenticationFailure
        );
    }

    #[test]
    fn tampered_tag_is_rejected(bit in 0usize..128) {
        let cipher = combined();
        let mut envelope = cipher.encrypt("tamper target", "pw").unwrap();
        envelope.tag = flip_hex_bit(&envelope.tag, bit);
        prop_assert_eq!(
            cipher.decrypt(&envelope, "pw").unwrap_err(),
            CipherError::AuthenticationFailure
        );
    }
}
