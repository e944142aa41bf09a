// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for lockbox.
//!
//! Holds the error taxonomy, the envelope and item data types, and the
//! collaborator traits (item store, session provider) that the vault crate
//! consumes but does not implement for production backends.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::{CipherError, LockboxError};
pub use traits::{SessionProvider, VaultItemStore};
pub use types::{
    Envelope, ItemDraft, ItemId, ItemPatch, ItemState, VaultItem, ENVELOPE_ALGORITHM,
    ENVELOPE_PARAM_HEX_LEN,
};
