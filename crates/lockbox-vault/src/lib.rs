// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side encryption and reveal control for lockbox.
//!
//! Every item secret is sealed into a self-describing [`Envelope`]
//! (PBKDF2-HMAC-SHA256 then AES-256-GCM, all fields lowercase hex) before it
//! reaches storage. A random master key, itself wrapped under the user's
//! password, is the secret for every item envelope.
//!
//! On top of the cipher sit a per-session [`DecryptionCache`] that never runs
//! two decrypts for the same item at once, and a [`BulkRevealController`]
//! that reveals the whole vault in small concurrent batches.
//!
//! [`Envelope`]: lockbox_core::Envelope

pub mod cache;
pub mod cipher;
pub mod crypto;
pub mod generator;
pub mod kdf;
pub mod prompt;
pub mod reveal;
pub mod session;
pub mod store;
pub mod view;

pub use cache::{DecryptionCache, Plaintext, Reveal};
pub use cipher::EnvelopeCipher;
pub use crypto::{
    generate_master_key, provider_for, CombinedTagProvider, CryptoProvider, DetachedTagProvider,
    SealedParts,
};
pub use generator::{generate_password, GeneratorOptions};
pub use kdf::derive_key;
pub use prompt::{get_master_password, get_master_password_with_confirm};
pub use reveal::{BulkPhase, BulkReport, BulkRevealController, BulkToggle};
pub use session::{MasterKeySession, SessionState};
pub use store::MemoryItemStore;
pub use view::{mask_secret, ItemEdit, NewItem, VaultView, ViewSummary};
