// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON vault file acting as both item store and login collaborator.
//!
//! The file holds the wrapped master key and the item list:
//!
//! ```json
//! { "encrypted_master_key": { "ciphertext": "…", … }, "items": [ … ] }
//! ```
//!
//! Every mutation rewrites the whole file through a temp file and rename, so
//! a crash never leaves a half-written vault. A mutation is applied to a copy
//! first and only replaces the in-memory state once the write succeeded.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use lockbox_core::{
    Envelope, ItemDraft, ItemId, ItemPatch, LockboxError, SessionProvider, VaultItem,
    VaultItemStore,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct VaultFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted_master_key: Option<Envelope>,
    #[serde(default)]
    pub items: Vec<VaultItem>,
}

pub struct JsonFileStore {
    path: PathBuf,
    file: Mutex<VaultFile>,
    password: Option<SecretString>,
}

impl JsonFileStore {
    /// Open an existing vault file.
    pub async fn open(path: &Path, password: Option<SecretString>) -> Result<Self, LockboxError> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LockboxError::InvalidInput(format!(
                    "vault file {} does not exist; run `lockbox init` first",
                    path.display()
                ))
            } else {
                LockboxError::storage(e)
            }
        })?;
        let file: VaultFile = serde_json::from_str(&raw).map_err(LockboxError::storage)?;
        debug!(path = %path.display(), items = file.items.len(), "vault file loaded");
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
            password,
        })
    }

    /// Create an empty vault file. Refuses to overwrite unless `force`.
    pub async fn initialize(
        path: &Path,
        password: Option<SecretString>,
        force: bool,
    ) -> Result<Self, LockboxError> {
        if !force && tokio::fs::try_exists(path).await.map_err(LockboxError::storage)? {
            return Err(LockboxError::InvalidInput(format!(
                "{} already exists; pass --force to overwrite",
                path.display()
            )));
        }
        let store = Self {
            path: path.to_path_buf(),
            file: Mutex::new(VaultFile::default()),
            password,
        };
        store.persist(&VaultFile::default()).await?;
        Ok(store)
    }

    /// Persist a newly created wrapped master key.
    pub async fn set_master_key(&self, wrapped: Envelope) -> Result<(), LockboxError> {
        let mut file = self.file.lock().await;
        let mut next = file.clone();
        next.encrypted_master_key = Some(wrapped);
        self.persist(&next).await?;
        *file = next;
        Ok(())
    }

    /// Write `file` to disk atomically.
    async fn persist(&self, file: &VaultFile) -> Result<(), LockboxError> {
        let json = serde_json::to_string_pretty(file).map_err(LockboxError::storage)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, json.as_bytes()))
            .await
            .map_err(|e| LockboxError::Internal(format!("vault write task failed: {e}")))?
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), LockboxError> {
    use std::io::Write;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(LockboxError::storage)?;
    tmp.write_all(contents).map_err(LockboxError::storage)?;
    tmp.as_file().sync_all().map_err(LockboxError::storage)?;
    tmp.persist(path).map_err(|e| LockboxError::storage(e.error))?;
    Ok(())
}

#[async_trait]
impl VaultItemStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<VaultItem>, LockboxError> {
        let file = self.file.lock().await;
        let mut items = file.items.clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
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
        let mut file = self.file.lock().await;
        let mut next = file.clone();
        next.items.push(item.clone());
        self.persist(&next).await?;
        *file = next;
        Ok(item)
    }

    async fn update(&self, id: &ItemId, patch: ItemPatch) -> Result<VaultItem, LockboxError> {
        let mut file = self.file.lock().await;
        let mut next = file.clone();
        let item = next
            .items
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| LockboxError::ItemNotFound(id.to_string()))?;
        patch.apply(item, Utc::now());
        let updated = item.clone();
        self.persist(&next).await?;
        *file = next;
        Ok(updated)
    }

    async fn delete(&self, id: &ItemId) -> Result<(), LockboxError> {
        let mut file = self.file.lock().await;
        let mut next = file.clone();
        next.items.retain(|item| &item.id != id);
        if next.items.len() == file.items.len() {
            return Err(LockboxError::ItemNotFound(id.to_string()));
        }
        self.persist(&next).await?;
        *file = next;
        Ok(())
    }
}

#[async_trait]
impl SessionProvider for JsonFileStore {
    async fn login_password(&self) -> Result<Option<SecretString>, LockboxError> {
        Ok(self
            .password
            .as_ref()
            .map(|p| SecretString::from(p.expose_secret().to_owned())))
    }

    async fn encrypted_master_key(&self) -> Result<Option<Envelope>, LockboxError> {
        Ok(self.file.lock().await.encrypted_master_key.clone())
    }
}
