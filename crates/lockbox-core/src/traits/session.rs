// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication collaborator.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::LockboxError;
use crate::types::Envelope;

/// Supplies what is needed to open a master key session.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The password the user just entered, if any.
    async fn login_password(&self) -> Result<Option<SecretString>, LockboxError>;

    /// The stored, wrapped master key for the account, if any.
    async fn encrypted_master_key(&self) -> Result<Option<Envelope>, LockboxError>;
}
