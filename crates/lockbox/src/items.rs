// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lockbox init | add | list | edit | remove | passwd` command implementations.

use std::io::{IsTerminal, Read};
use std::path::Path;
use std::sync::Arc;

use lockbox_config::LockboxConfig;
use lockbox_core::{ItemId, LockboxError, VaultItem};
use lockbox_vault::prompt::prompt_secret;
use lockbox_vault::{
    generate_password, get_master_password, get_master_password_with_confirm, mask_secret,
    EnvelopeCipher, GeneratorOptions, ItemEdit, MasterKeySession, NewItem, Reveal, SessionState,
    VaultView,
};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;
use zeroize::Zeroizing;

use crate::file_store::JsonFileStore;

/// Environment variable holding the replacement password for `passwd`.
pub const NEW_MASTER_PASSWORD_ENV_VAR: &str = "LOCKBOX_NEW_MASTER_PASSWORD";

const HIDDEN_PLACEHOLDER: &str = "********";

/// Where a new or edited secret comes from.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecretSource {
    pub generate: bool,
    pub length: Option<usize>,
    pub symbols: bool,
}

/// Text metadata for `add`.
#[derive(Debug, Clone, Default)]
pub struct ItemFields {
    pub title: Option<String>,
    pub username: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

/// Create a new vault file protected by a fresh master key.
pub async fn run_init(
    path: &Path,
    force: bool,
    config: &LockboxConfig,
) -> Result<(), LockboxError> {
    let password = get_master_password_with_confirm()?;
    let cipher = EnvelopeCipher::from_config(&config.vault);
    let (_session, wrapped) = MasterKeySession::create(&password, &cipher, &config.vault).await?;

    let store = JsonFileStore::initialize(path, None, force).await?;
    store.set_master_key(wrapped).await?;
    info!(path = %path.display(), backend = cipher.provider_name(), "vault created");
    println!("Created vault {}", path.display());
    Ok(())
}

pub async fn run_add(
    path: &Path,
    fields: ItemFields,
    source: SecretSource,
    config: &LockboxConfig,
) -> Result<(), LockboxError> {
    let title = fields
        .title
        .ok_or_else(|| LockboxError::InvalidInput("--title is required".to_string()))?;
    let secret = acquire_secret(source, config)?;
    let view = open_view(path, config).await?;

    let item = view
        .add_item(NewItem {
            title,
            username: fields.username,
            url: fields.url,
            notes: fields.notes,
            secret: secret.value,
        })
        .await?;

    println!("Added {} ({})", item.title, item.id);
    if let Some(shown) = secret.generated {
        println!("Generated password: {}", shown.as_str());
    }
    Ok(())
}

/// Options for `list`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListOptions {
    pub reveal: bool,
    pub show: bool,
    pub plain: bool,
}

pub async fn run_list(
    path: &Path,
    options: ListOptions,
    config: &LockboxConfig,
) -> Result<(), LockboxError> {
    let view = open_view(path, config).await?;
    let items = view.items()?;
    let use_color = !options.plain && std::io::stdout().is_terminal();

    if options.reveal && !items.is_empty() {
        let report = view.reveal_all().await?;
        if !report.errored.is_empty() {
            eprintln!("warning: {} item(s) could not be decrypted", report.errored.len());
        }
    }

    if items.is_empty() {
        println!("No items.");
    }
    for item in &items {
        let value = display_value(view.revealed_value(&item.id)?, options.show, use_color);
        println!("{}", format_row(item, &value));
    }

    let summary = view.summary()?;
    println!(
        "{} items \u{2022} {} revealed \u{2022} {} cached",
        summary.items, summary.revealed, summary.cached
    );
    Ok(())
}

pub async fn run_edit(
    path: &Path,
    id: &str,
    fields: ItemFields,
    source: Option<SecretSource>,
    config: &LockboxConfig,
) -> Result<(), LockboxError> {
    let secret = source.map(|s| acquire_secret(s, config)).transpose()?;
    let view = open_view(path, config).await?;

    let generated = secret.as_ref().and_then(|s| s.generated.clone());
    let item = view
        .update_item(
            &ItemId::from(id),
            ItemEdit {
                title: fields.title,
                username: fields.username,
                url: fields.url,
                notes: fields.notes,
                secret: secret.map(|s| s.value),
            },
        )
        .await?;

    println!("Updated {} ({})", item.title, item.id);
    if let Some(shown) = generated {
        println!("Generated password: {}", shown.as_str());
    }
    Ok(())
}

pub async fn run_remove(path: &Path, id: &str, config: &LockboxConfig) -> Result<(), LockboxError> {
    let view = open_view(path, config).await?;
    view.delete_item(&ItemId::from(id)).await?;
    println!("Removed {id}");
    Ok(())
}

/// Re-wrap the master key under a new password. Items are untouched.
pub async fn run_passwd(path: &Path, config: &LockboxConfig) -> Result<(), LockboxError> {
    let (store, session) = unlock(path, config).await?;
    let new_password = new_master_password()?;
    let cipher = EnvelopeCipher::from_config(&config.vault);
    let wrapped = session.rewrap(&new_password, &cipher, &config.vault).await?;
    store.set_master_key(wrapped).await?;
    println!("Master password changed");
    Ok(())
}

/// Open the vault file and resolve a session from the master password.
async fn unlock(
    path: &Path,
    config: &LockboxConfig,
) -> Result<(Arc<JsonFileStore>, MasterKeySession), LockboxError> {
    let password = get_master_password()?;
    let store = Arc::new(JsonFileStore::open(path, Some(password)).await?);
    let cipher = EnvelopeCipher::from_config(&config.vault);

    let (state, created) = MasterKeySession::resolve(store.as_ref(), &cipher, &config.vault).await?;
    if let Some(wrapped) = created {
        store.set_master_key(wrapped).await?;
    }
    match state {
        SessionState::Ready(session) => Ok((store, session)),
        SessionState::NeedsReauthentication => Err(LockboxError::Locked),
    }
}

async fn open_view(
    path: &Path,
    config: &LockboxConfig,
) -> Result<VaultView<JsonFileStore>, LockboxError> {
    let (store, session) = unlock(path, config).await?;
    let view = VaultView::new(store, EnvelopeCipher::from_config(&config.vault), &config.vault);
    view.begin_session(session)?;
    view.refresh().await?;
    Ok(view)
}

struct AcquiredSecret {
    value: Zeroizing<String>,
    generated: Option<Zeroizing<String>>,
}

fn acquire_secret(
    source: SecretSource,
    config: &LockboxConfig,
) -> Result<AcquiredSecret, LockboxError> {
    if source.generate {
        let mut options = GeneratorOptions::from(&config.generator);
        if let Some(length) = source.length {
            options.length = length;
        }
        options.symbols |= source.symbols;
        let value = generate_password(&options)?;
        return Ok(AcquiredSecret {
            generated: Some(value.clone()),
            value,
        });
    }

    let value = if std::io::stdin().is_terminal() {
        let secret = prompt_secret("Secret: ")?;
        Zeroizing::new(secret.expose_secret().to_owned())
    } else {
        read_stdin_trimmed()?
    };
    if value.is_empty() {
        return Err(LockboxError::InvalidInput("secret must not be empty".to_string()));
    }
    Ok(AcquiredSecret {
        value,
        generated: None,
    })
}

fn new_master_password() -> Result<SecretString, LockboxError> {
    if let Ok(value) = std::env::var(NEW_MASTER_PASSWORD_ENV_VAR) {
        if !value.is_empty() {
            return Ok(SecretString::from(value));
        }
    }
    let first = prompt_secret("New master password: ")?;
    let second = prompt_secret("Confirm master password: ")?;
    if first.expose_secret() != second.expose_secret() {
        return Err(LockboxError::InvalidInput("passwords do not match".to_string()));
    }
    Ok(first)
}

/// Read all of stdin, dropping one trailing newline.
pub(crate) fn read_stdin_trimmed() -> Result<Zeroizing<String>, LockboxError> {
    let mut buf = Zeroizing::new(String::new());
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(LockboxError::storage)?;
    let trimmed_len = buf.trim_end_matches(['\r', '\n']).len();
    buf.truncate(trimmed_len);
    Ok(buf)
}

fn display_value(value: Option<Reveal>, show: bool, use_color: bool) -> String {
    use colored::Colorize;

    match value {
        None => HIDDEN_PLACEHOLDER.to_string(),
        Some(Reveal::Errored(_)) if use_color => "decryption error".red().to_string(),
        Some(Reveal::Errored(_)) => "decryption error".to_string(),
        Some(Reveal::Plaintext(plaintext)) => {
            let text = if show {
                plaintext.expose().to_string()
            } else {
                mask_secret(plaintext.expose())
            };
            if use_color { text.green().to_string() } else { text }
        }
    }
}

fn format_row(item: &VaultItem, value: &str) -> String {
    let username = item.username.as_deref().unwrap_or("-");
    format!("{}  {:<24} {:<24} {}", item.id, item.title, username, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_core::{Envelope, ENVELOPE_ALGORITHM};
    use lockbox_vault::Plaintext;

    fn item(username: Option<&str>) -> VaultItem {
        let now = chrono::Utc::now();
        VaultItem {
            id: ItemId::from("id-1"),
            title: "mail".into(),
            username: username.map(str::to_string),
            url: None,
            notes: None,
            encrypted: Envelope {
                ciphertext: String::new(),
                iv: "00".repeat(16),
                salt: "00".repeat(16),
                tag: "00".repeat(16),
                algorithm: ENVELOPE_ALGORITHM.into(),
            },
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn hidden_values_use_placeholder() {
        assert_eq!(display_value(None, true, false), HIDDEN_PLACEHOLDER);
    }

    #[test]
    fn revealed_values_are_masked_unless_shown() {
        let value = || {
            Some(Reveal::Plaintext(Plaintext::new(Zeroizing::new("Sup3r$ecret!".into()))))
        };
        assert_eq!(display_value(value(), false, false), "Sup3...ret!");
        assert_eq!(display_value(value(), true, false), "Sup3r$ecret!");
    }

    #[test]
    fn errored_values_say_so() {
        let value = Some(Reveal::Errored(lockbox_core::CipherError::AuthenticationFailure));
        assert_eq!(display_value(value, true, false), "decryption error");
    }

    #[test]
    fn rows_show_dash_for_missing_username() {
        let row = format_row(&item(None), "****");
        assert!(row.starts_with("id-1  mail"));
        assert!(row.contains(" - "));
        assert!(row.ends_with("****"));
    }

    #[test]
    fn generated_secret_honours_overrides() {
        let config = LockboxConfig::default();
        let secret = acquire_secret(
            SecretSource {
                generate: true,
                length: Some(40),
                symbols: false,
            },
            &config,
        )
        .unwrap();
        assert_eq!(secret.value.chars().count(), 40);
        assert_eq!(secret.generated.as_deref().map(String::as_str), Some(secret.value.as_str()));
    }
}
