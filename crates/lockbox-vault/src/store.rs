// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`VaultItemStore`].

use async_trait::async_trait;
use chrono::Utc;
use lockbox_core::{ItemDraft, ItemId, ItemPatch, LockboxError, VaultItem, VaultItemStore};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Items held in process memory, newest first.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    items: RwLock<Vec<VaultItem>>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing set of items.
    pub fn with_items(mut items: Vec<VaultItem>) -> Self {
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self {
            items: RwLock::new(items),
        }
    }
}

#[async_trait]
impl VaultItemStore for MemoryItemStore {
    async fn list(&self) -> Result<Vec<VaultItem>, LockboxError> {
        Ok(self.items.read().await.clone())
    }

    async fn create(&self, draft: ItemDraft) -> Result<VaultItem, LockboxError> {
        let now = Utc::now();
        let item = VaultItem {
            id: ItemId(Uuid::new_v4().to_string()),
            title: draft.title,
            username: draft.username,
            url: draft.url,
            notes: draft.notes,
            encrypted: draft.encrypted,
            created_at: now,
            updated_at: now,
        };
        self.items.write().await.insert(0, item.clone());
        Ok(item)
    }

    async fn update(&self, id: &ItemId, patch: ItemPatch) -> Result<VaultItem, LockboxError> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| LockboxError::ItemNotFound(id.to_string()))?;
        patch.apply(item, Utc::now());
        Ok(item.clone())
    }

    async fn delete(&self, id: &ItemId) -> Result<(), LockboxError> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| &item.id != id);
        if items.len() == before {
            return Err(LockboxError::ItemNotFound(id.to_string()));
        }
        Ok(())
    }
}
