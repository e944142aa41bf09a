// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./lockbox.toml` > `~/.config/lockbox/lockbox.toml` > `/etc/lockbox/lockbox.toml`
//! with environment variable overrides via `LOCKBOX_` prefix.

// figment::Error is external and cannot be boxed without a wrapper.
#![allow(clippy::result_large_err)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LockboxConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lockbox/lockbox.toml` (system-wide)
/// 3. `~/.config/lockbox/lockbox.toml` (user XDG config)
/// 4. `./lockbox.toml` (local directory)
/// 5. `LOCKBOX_*` environment variables
pub fn load_config() -> Result<LockboxConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<LockboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LockboxConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(LockboxConfig::default()))
        .merge(Toml::file("/etc/lockbox/lockbox.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("lockbox/lockbox.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("lockbox.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `LOCKBOX_VAULT_REVEAL_BATCH_SIZE` must map to
/// `vault.reveal_batch_size`. The master password variables are secrets, not
/// config keys, and are ignored here.
fn env_provider() -> Env {
    Env::prefixed("LOCKBOX_")
        .ignore(&["master_password", "new_master_password"])
        .map(|key| {
            // Keys arrive with their original case.
            let key_str = key.as_str().to_ascii_lowercase();
            let mapped = key_str
                .replacen("log_", "log.", 1)
                .replacen("vault_", "vault.", 1)
                .replacen("generator_", "generator.", 1);
            mapped.into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AeadBackend;

    #[test]
    fn env_overrides_file_values() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("lockbox.toml", "[vault]\nreveal_batch_size = 5\n")?;
            jail.set_env("LOCKBOX_VAULT_REVEAL_BATCH_SIZE", "7");
            jail.set_env("LOCKBOX_VAULT_AEAD_BACKEND", "combined");
            jail.set_env("LOCKBOX_MASTER_PASSWORD", "not-a-config-key");

            let config = load_config_from_path(Path::new("lockbox.toml"))?;
            assert_eq!(config.vault.reveal_batch_size, 7);
            assert_eq!(config.vault.aead_backend, AeadBackend::Combined);
            Ok(())
        });
    }

    #[test]
    fn generator_env_key_maps_to_section() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LOCKBOX_GENERATOR_LENGTH", "20");
            let config = load_config()?;
            assert_eq!(config.generator.length, 20);
            Ok(())
        });
    }

    #[test]
    fn uppercase_env_keys_reach_every_section() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("LOCKBOX_LOG_LEVEL", "debug");
            jail.set_env("LOCKBOX_VAULT_AEAD_BACKEND", "combined");
            jail.set_env("LOCKBOX_GENERATOR_SYMBOLS", "true");
            jail.set_env("LOCKBOX_NEW_MASTER_PASSWORD", "not-a-config-key");

            let config = load_config()?;
            assert_eq!(config.log.level, "debug");
            assert_eq!(config.vault.aead_backend, AeadBackend::Combined);
            assert!(config.generator.symbols);
            Ok(())
        });
    }
}
