// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault view controller.
//!
//! Owns the active session, the decryption cache, the bulk reveal controller
//! and the current item list. The cache lives exactly as long as the view, so
//! independent views never share plaintexts.

use std::sync::{Arc, RwLock};

use lockbox_config::VaultConfig;
use lockbox_core::{
    ItemDraft, ItemId, ItemPatch, ItemState, LockboxError, VaultItem, VaultItemStore,
};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::cache::{DecryptionCache, Plaintext, Reveal};
use crate::cipher::EnvelopeCipher;
use crate::reveal::{BulkPhase, BulkReport, BulkRevealController, BulkToggle};
use crate::session::MasterKeySession;

/// Fields for a new item. The secret is encrypted before it reaches storage.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub title: String,
    pub username: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub secret: Zeroizing<String>,
}

/// Edit of an existing item. `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct ItemEdit {
    pub title: Option<String>,
    pub username: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub secret: Option<Zeroizing<String>>,
}

/// Counts for a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSummary {
    pub items: usize,
    pub revealed: usize,
    pub cached: usize,
}

pub struct VaultView<S> {
    store: Arc<S>,
    cipher: EnvelopeCipher,
    cache: Arc<DecryptionCache>,
    bulk: BulkRevealController,
    items: RwLock<Vec<VaultItem>>,
}

impl<S: VaultItemStore> VaultView<S> {
    pub fn new(store: Arc<S>, cipher: EnvelopeCipher, config: &VaultConfig) -> Self {
        let cache = Arc::new(DecryptionCache::new(cipher.clone()));
        let bulk = BulkRevealController::new(Arc::clone(&cache), config.reveal_batch_size);
        Self {
            store,
            cipher,
            cache,
            bulk,
            items: RwLock::new(Vec::new()),
        }
    }

    /// Install a session. Anything cached under a previous one is dropped.
    pub fn begin_session(&self, session: MasterKeySession) -> Result<(), LockboxError> {
        info!(session_id = session.id(), "vault session started");
        self.cache.set_session(Some(Arc::new(session)))
    }

    /// Drop the session and every cached plaintext.
    pub fn end_session(&self) -> Result<(), LockboxError> {
        self.cache.set_session(None)?;
        self.bulk.hide_all().or_else(|e| match e {
            LockboxError::BulkInProgress => Ok(()),
            other => Err(other),
        })?;
        info!("vault session ended");
        Ok(())
    }

    pub fn is_unlocked(&self) -> Result<bool, LockboxError> {
        Ok(self.cache.session()?.is_some())
    }

    /// Reload items from the store and drop cache entries for vanished items.
    pub async fn refresh(&self) -> Result<usize, LockboxError> {
        let items = self.store.list().await?;
        let count = items.len();
        self.cache.reconcile(items.iter().map(|item| &item.id))?;
        *self.items_mut()? = items;
        debug!(count, "vault items refreshed");
        Ok(count)
    }

    /// Snapshot of the current items.
    pub fn items(&self) -> Result<Vec<VaultItem>, LockboxError> {
        Ok(self.items_ref()?.clone())
    }

    pub fn find(&self, id: &ItemId) -> Result<VaultItem, LockboxError> {
        self.items_ref()?
            .iter()
            .find(|item| &item.id == id)
            .cloned()
            .ok_or_else(|| LockboxError::ItemNotFound(id.to_string()))
    }

    /// Encrypt and store a new item. Its plaintext is cached, hidden, unless
    /// the session changed while the item was being written.
    pub async fn add_item(&self, new: NewItem) -> Result<VaultItem, LockboxError> {
        if new.title.trim().is_empty() {
            return Err(LockboxError::InvalidInput("title must not be empty".to_string()));
        }
        let epoch = self.cache.epoch()?;
        let session = self.require_session()?;

        let encrypted = self
            .cipher
            .encrypt_async(new.secret.clone(), session.item_secret())
            .await?;
        let item = self
            .store
            .create(ItemDraft {
                title: new.title,
                username: new.username,
                url: new.url,
                notes: new.notes,
                encrypted,
            })
            .await?;

        self.items_mut()?.insert(0, item.clone());
        self.cache
            .store_plaintext_if_current(&item.id, new.secret, epoch)?;
        info!(item_id = %item.id, "item added");
        Ok(item)
    }

    /// Apply an edit. The secret is re-encrypted only if it actually changed.
    pub async fn update_item(
        &self,
        id: &ItemId,
        edit: ItemEdit,
    ) -> Result<VaultItem, LockboxError> {
        let current = self.find(id)?;
        let epoch = self.cache.epoch()?;
        let mut patch = ItemPatch {
            title: edit.title,
            username: edit.username,
            url: edit.url,
            notes: edit.notes,
            encrypted: None,
        };

        let mut new_secret = None;
        if let Some(secret) = edit.secret {
            let unchanged = match self.cache.load(&current).await? {
                Reveal::Plaintext(existing) => existing.expose() == secret.as_str(),
                Reveal::Errored(_) => false,
            };
            if !unchanged {
                let session = self.require_session()?;
                patch.encrypted = Some(
                    self.cipher
                        .encrypt_async(secret.clone(), session.item_secret())
                        .await?,
                );
                new_secret = Some(secret);
            }
        }

        if patch.is_empty() {
            debug!(item_id = %id, "edit changes nothing");
            return Ok(current);
        }

        let updated = self.store.update(id, patch).await?;
        if let Some(item) = self.items_mut()?.iter_mut().find(|item| &item.id == id) {
            *item = updated.clone();
        }
        if let Some(secret) = new_secret {
            if !self.cache.store_plaintext_if_current(id, secret, epoch)? {
                // Stale cached value must not outlive the re-encrypt.
                self.cache.remove(id)?;
            }
            debug!(item_id = %id, "item secret re-encrypted");
        }
        info!(item_id = %id, "item updated");
        Ok(updated)
    }

    pub async fn delete_item(&self, id: &ItemId) -> Result<(), LockboxError> {
        self.store.delete(id).await?;
        self.items_mut()?.retain(|item| &item.id != id);
        self.cache.remove(id)?;
        info!(item_id = %id, "item deleted");
        Ok(())
    }

    /// The plaintext for an edit form. Decrypts if needed but leaves the
    /// item's revealed state alone.
    pub async fn secret_for_edit(&self, id: &ItemId) -> Result<Plaintext, LockboxError> {
        let item = self.find(id)?;
        match self.cache.load(&item).await? {
            Reveal::Plaintext(plaintext) => Ok(plaintext),
            Reveal::Errored(e) => Err(e.into()),
        }
    }

    pub async fn reveal(&self, id: &ItemId) -> Result<Reveal, LockboxError> {
        let item = self.find(id)?;
        self.cache.reveal_one(&item).await
    }

    pub fn hide(&self, id: &ItemId) -> Result<(), LockboxError> {
        self.cache.hide_one(id)
    }

    /// Flip one item. Returns the value when it ends up revealed.
    pub async fn toggle(&self, id: &ItemId) -> Result<Option<Reveal>, LockboxError> {
        if self.cache.revealed_value(id)?.is_some() {
            self.hide(id)?;
            Ok(None)
        } else {
            self.reveal(id).await.map(Some)
        }
    }

    pub async fn reveal_all(&self) -> Result<BulkReport, LockboxError> {
        let items = self.items()?;
        self.bulk.reveal_all(&items).await
    }

    pub fn hide_all(&self) -> Result<(), LockboxError> {
        self.bulk.hide_all()
    }

    pub async fn toggle_all(&self) -> Result<BulkToggle, LockboxError> {
        let items = self.items()?;
        self.bulk.toggle_all(&items).await
    }

    pub fn bulk_phase(&self) -> BulkPhase {
        self.bulk.phase()
    }

    pub fn item_state(&self, id: &ItemId) -> Result<ItemState, LockboxError> {
        self.cache.state_of(id)
    }

    /// The value to display for an item, if it is revealed.
    pub fn revealed_value(&self, id: &ItemId) -> Result<Option<Reveal>, LockboxError> {
        self.cache.revealed_value(id)
    }

    pub fn summary(&self) -> Result<ViewSummary, LockboxError> {
        Ok(ViewSummary {
            items: self.items_ref()?.len(),
            revealed: self.cache.revealed_count()?,
            cached: self.cache.cached_count()?,
        })
    }

    fn require_session(&self) -> Result<Arc<MasterKeySession>, LockboxError> {
        self.cache.session()?.ok_or(LockboxError::Locked)
    }

    fn items_ref(&self) -> Result<std::sync::RwLockReadGuard<'_, Vec<VaultItem>>, LockboxError> {
        self.items
            .read()
            .map_err(|_| LockboxError::Internal("item list lock poisoned".to_string()))
    }

    fn items_mut(&self) -> Result<std::sync::RwLockWriteGuard<'_, Vec<VaultItem>>, LockboxError> {
        self.items
            .write()
            .map_err(|_| LockboxError::Internal("item list lock poisoned".to_string()))
    }
}

/// Mask a secret for display, keeping 4 characters at each end.
pub fn mask_secret(value: &str) -> String {
    let len = value.chars().count();
    if len < 10 {
        return "****".to_string();
    }
    let prefix: String = value.chars().take(4).collect();
    let suffix: String = value.chars().skip(len - 4).collect();
    format!("{prefix}...{suffix}")
}
