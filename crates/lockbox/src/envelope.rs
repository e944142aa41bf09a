// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lockbox encrypt` and `lockbox decrypt`: raw envelope operations.
//!
//! Input comes from the argument when given, otherwise from stdin. The
//! password comes from `LOCKBOX_MASTER_PASSWORD` or a prompt.

use lockbox_config::LockboxConfig;
use lockbox_core::{Envelope, LockboxError};
use lockbox_vault::{get_master_password, EnvelopeCipher};
use secrecy::ExposeSecret;
use zeroize::Zeroizing;

use crate::items::read_stdin_trimmed;

pub async fn run_encrypt(text: Option<String>, config: &LockboxConfig) -> Result<(), LockboxError> {
    let plaintext = match text {
        Some(text) => Zeroizing::new(text),
        None => read_stdin_trimmed()?,
    };
    let password = get_master_password()?;
    let cipher = EnvelopeCipher::from_config(&config.vault);

    let envelope = cipher
        .encrypt_async(plaintext, Zeroizing::new(password.expose_secret().to_owned()))
        .await?;
    println!("{}", envelope.to_json());
    Ok(())
}

pub async fn run_decrypt(
    envelope: Option<String>,
    config: &LockboxConfig,
) -> Result<(), LockboxError> {
    let raw = match envelope {
        Some(raw) => raw,
        None => read_stdin_trimmed()?.to_string(),
    };
    let envelope = Envelope::from_json(raw.trim())?;
    let password = get_master_password()?;
    let cipher = EnvelopeCipher::from_config(&config.vault);

    let plaintext = cipher
        .decrypt_async(envelope, Zeroizing::new(password.expose_secret().to_owned()))
        .await??;
    println!("{}", plaintext.as_str());
    Ok(())
}
