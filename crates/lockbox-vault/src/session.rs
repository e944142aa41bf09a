// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master key session.
//!
//! The vault's master key is 32 random bytes, stored only as an envelope
//! encrypted under the user's login password. Unlocking decrypts that
//! envelope once and holds the key in memory until the session ends. Item
//! secrets are sealed with the key's 64-character hex form as their password.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use lockbox_config::VaultConfig;
use lockbox_core::{CipherError, Envelope, LockboxError, SessionProvider};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::cipher::EnvelopeCipher;
use crate::crypto::generate_master_key;
use crate::kdf::{decode_lower_hex, KEY_LEN};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// An unlocked master key.
///
/// Zeroed on drop. `Debug` never prints key material.
pub struct MasterKeySession {
    id: u64,
    key: Zeroizing<[u8; KEY_LEN]>,
    key_hex: Zeroizing<String>,
}

impl fmt::Debug for MasterKeySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MasterKeySession")
            .field("id", &self.id)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Outcome of asking the collaborators for a session.
#[derive(Debug)]
pub enum SessionState {
    Ready(MasterKeySession),
    /// No login password is available. The user must authenticate again;
    /// this is not an error.
    NeedsReauthentication,
}

impl MasterKeySession {
    /// Wrap raw key bytes in a session.
    pub fn from_key(key: Zeroizing<[u8; KEY_LEN]>) -> Self {
        let key_hex = Zeroizing::new(hex::encode(&key[..]));
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            key,
            key_hex,
        }
    }

    /// Generate a new master key and wrap it under `password`.
    ///
    /// Returns the session together with the envelope to persist.
    pub async fn create(
        password: &SecretString,
        cipher: &EnvelopeCipher,
        config: &VaultConfig,
    ) -> Result<(Self, Envelope), LockboxError> {
        check_password_len(password, config)?;

        let session = Self::from_key(generate_master_key()?);
        let wrapped = session.wrap(password, cipher).await?;
        info!(session_id = session.id, "master key created");
        Ok((session, wrapped))
    }

    /// Decrypt the stored master key envelope with `password`.
    ///
    /// A wrong password, a tampered or malformed envelope, and a payload that
    /// is not a 64-character hex key all fail as
    /// [`LockboxError::InvalidCredentials`].
    pub async fn unlock(
        wrapped: &Envelope,
        password: &SecretString,
        cipher: &EnvelopeCipher,
    ) -> Result<Self, LockboxError> {
        let secret = Zeroizing::new(password.expose_secret().to_owned());
        let plaintext = match cipher.decrypt_async(wrapped.clone(), secret).await? {
            Ok(plaintext) => plaintext,
            Err(e) => {
                warn!(error = %e, "master key unwrap failed");
                return Err(LockboxError::InvalidCredentials);
            }
        };

        let key: [u8; KEY_LEN] = decode_lower_hex(&plaintext).map_err(|reason| {
            warn!(%reason, "unwrapped master key is malformed");
            LockboxError::InvalidCredentials
        })?;
        let session = Self::from_key(Zeroizing::new(key));
        debug!(session_id = session.id, "master key unlocked");
        Ok(session)
    }

    /// Resolve a session from the login collaborators.
    ///
    /// No login password yields [`SessionState::NeedsReauthentication`]. A
    /// password but no stored master key is a first login and creates one;
    /// the caller must persist the returned envelope.
    pub async fn resolve<P>(
        provider: &P,
        cipher: &EnvelopeCipher,
        config: &VaultConfig,
    ) -> Result<(SessionState, Option<Envelope>), LockboxError>
    where
        P: SessionProvider + ?Sized,
    {
        let Some(password) = provider.login_password().await? else {
            debug!("no login password available");
            return Ok((SessionState::NeedsReauthentication, None));
        };

        match provider.encrypted_master_key().await? {
            Some(wrapped) => {
                let session = Self::unlock(&wrapped, &password, cipher).await?;
                Ok((SessionState::Ready(session), None))
            }
            None => {
                let (session, wrapped) = Self::create(&password, cipher, config).await?;
                Ok((SessionState::Ready(session), Some(wrapped)))
            }
        }
    }

    /// Re-wrap the same master key under a new password.
    ///
    /// Item envelopes stay valid because the key itself does not change.
    pub async fn rewrap(
        &self,
        new_password: &SecretString,
        cipher: &EnvelopeCipher,
        config: &VaultConfig,
    ) -> Result<Envelope, LockboxError> {
        check_password_len(new_password, config)?;
        let wrapped = self.wrap(new_password, cipher).await?;
        info!(session_id = self.id, "master key re-wrapped");
        Ok(wrapped)
    }

    async fn wrap(
        &self,
        password: &SecretString,
        cipher: &EnvelopeCipher,
    ) -> Result<Envelope, LockboxError> {
        cipher
            .encrypt_async(
                self.key_hex.clone(),
                Zeroizing::new(password.expose_secret().to_owned()),
            )
            .await
    }

    /// Identity of this session; changes every time a key is loaded.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Raw master key bytes.
    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    /// Encrypt an item secret under this master key.
    pub fn seal_item(
        &self,
        cipher: &EnvelopeCipher,
        plaintext: &str,
    ) -> Result<Envelope, CipherError> {
        cipher.encrypt(plaintext, &self.key_hex)
    }

    /// Decrypt an item envelope sealed by [`seal_item`](Self::seal_item).
    pub fn open_item(
        &self,
        cipher: &EnvelopeCipher,
        envelope: &Envelope,
    ) -> Result<Zeroizing<String>, CipherError> {
        cipher.decrypt(envelope, &self.key_hex)
    }

    /// Password used for item envelopes.
    pub(crate) fn item_secret(&self) -> Zeroizing<String> {
        self.key_hex.clone()
    }
}

fn check_password_len(password: &SecretString, config: &VaultConfig) -> Result<(), LockboxError> {
    let len = password.expose_secret().chars().count();
    if len < config.min_master_password_len {
        return Err(LockboxError::InvalidInput(format!(
            "master password must be at least {} characters",
            config.min_master_password_len
        )));
    }
    Ok(())
}
