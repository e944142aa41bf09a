// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Item persistence collaborator.

use async_trait::async_trait;

use crate::error::LockboxError;
use crate::types::{ItemDraft, ItemId, ItemPatch, VaultItem};

/// Persistence backend for vault items.
///
/// Implementations must pass the `encrypted` envelope through unmodified;
/// it is opaque to storage.
#[async_trait]
pub trait VaultItemStore: Send + Sync + 'static {
    /// All items owned by the current user.
    async fn list(&self) -> Result<Vec<VaultItem>, LockboxError>;

    /// Persist a new item and return it with its assigned id and timestamps.
    async fn create(&self, draft: ItemDraft) -> Result<VaultItem, LockboxError>;

    /// Apply a partial update. Fails with `ItemNotFound` for unknown ids.
    async fn update(&self, id: &ItemId, patch: ItemPatch) -> Result<VaultItem, LockboxError>;

    /// Remove an item. Fails with `ItemNotFound` for unknown ids.
    async fn delete(&self, id: &ItemId) -> Result<(), LockboxError>;
}
