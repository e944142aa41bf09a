// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared between the cipher, the reveal controllers, and the
//! storage collaborators.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CipherError;

/// The only algorithm identifier an envelope may carry.
pub const ENVELOPE_ALGORITHM: &str = "aes-256-gcm";

/// Hex length of `iv`, `salt` and `tag` (16 bytes each).
pub const ENVELOPE_PARAM_HEX_LEN: usize = 32;

/// Stable identity of a vault item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Self-describing encrypted secret.
///
/// Every field is lowercase hex except `algorithm`. Storage treats the whole
/// struct as an opaque blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub ciphertext: String,
    pub iv: String,
    pub salt: String,
    pub tag: String,
    pub algorithm: String,
}

impl Envelope {
    /// Parse an envelope from its JSON storage form.
    ///
    /// A missing or mistyped field is reported as
    /// [`CipherError::InvalidEnvelopeShape`]; format checks happen in the
    /// cipher.
    pub fn from_json(json: &str) -> Result<Self, CipherError> {
        serde_json::from_str(json).map_err(|e| CipherError::InvalidEnvelopeShape(e.to_string()))
    }

    /// Check the wire format of every field.
    ///
    /// `iv`, `salt` and `tag` must be exactly 32 lowercase hex characters,
    /// `ciphertext` an even-length lowercase hex string (possibly empty), and
    /// `algorithm` must be `"aes-256-gcm"`.
    pub fn validate(&self) -> Result<(), CipherError> {
        if self.algorithm != ENVELOPE_ALGORITHM {
            return Err(CipherError::InvalidEnvelopeShape(format!(
                "unsupported algorithm '{}'",
                self.algorithm
            )));
        }
        for (field, value) in [("iv", &self.iv), ("salt", &self.salt), ("tag", &self.tag)] {
            if value.len() != ENVELOPE_PARAM_HEX_LEN {
                return Err(CipherError::InvalidEnvelopeShape(format!(
                    "{field}: expected {ENVELOPE_PARAM_HEX_LEN} hex characters, got {}",
                    value.len()
                )));
            }
            check_lower_hex(field, value)?;
        }
        if self.ciphertext.len() % 2 != 0 {
            return Err(CipherError::InvalidEnvelopeShape(
                "ciphertext: odd number of hex characters".to_string(),
            ));
        }
        check_lower_hex("ciphertext", &self.ciphertext)
    }

    /// Serialize to the JSON storage form.
    pub fn to_json(&self) -> String {
        // A struct of five strings always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn check_lower_hex(field: &str, value: &str) -> Result<(), CipherError> {
    let lower_hex = value
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
    if lower_hex {
        Ok(())
    } else {
        Err(CipherError::InvalidEnvelopeShape(format!(
            "{field}: expected lowercase hex"
        )))
    }
}

/// A stored credential. The core only ever looks at `id` and `encrypted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub encrypted: Envelope,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating an item; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub title: String,
    pub username: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub encrypted: Envelope,
}

/// Partial update of an item. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub title: Option<String>,
    pub username: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub encrypted: Option<Envelope>,
}

impl ItemPatch {
    /// Apply the patch in place and bump `updated_at`.
    pub fn apply(self, item: &mut VaultItem, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(username) = self.username {
            item.username = Some(username);
        }
        if let Some(url) = self.url {
            item.url = Some(url);
        }
        if let Some(notes) = self.notes {
            item.notes = Some(notes);
        }
        if let Some(encrypted) = self.encrypted {
            item.encrypted = encrypted;
        }
        item.updated_at = now;
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Display state of a single item, driven only by the reveal controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemState {
    Hidden,
    Decrypting,
    Revealed,
    Errored,
}
