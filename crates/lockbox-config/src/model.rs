// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for lockbox.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.
//!
//! Key derivation parameters are deliberately absent: envelopes do not
//! record them, so every implementation must use the same fixed values.

use serde::{Deserialize, Serialize};

/// Top-level lockbox configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LockboxConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Cipher backend and reveal behavior.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Password generator defaults.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which AEAD call shape the envelope cipher adapts to internally.
///
/// Both produce byte-identical envelopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AeadBackend {
    /// Tag produced and consumed as a separate buffer.
    #[default]
    Detached,
    /// Tag appended to the ciphertext in one buffer.
    Combined,
}

/// Vault cipher and reveal configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// AEAD backend (default: detached).
    #[serde(default)]
    pub aead_backend: AeadBackend,

    /// Items decrypted concurrently per reveal-all batch (default: 3).
    #[serde(default = "default_reveal_batch_size")]
    pub reveal_batch_size: usize,

    /// Minimum master password length accepted at signup (default: 8).
    #[serde(default = "default_min_master_password_len")]
    pub min_master_password_len: usize,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            aead_backend: AeadBackend::default(),
            reveal_batch_size: default_reveal_batch_size(),
            min_master_password_len: default_min_master_password_len(),
        }
    }
}

fn default_reveal_batch_size() -> usize {
    3
}

fn default_min_master_password_len() -> usize {
    8
}

/// Password generator defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Generated password length (default: 12).
    #[serde(default = "default_generator_length")]
    pub length: usize,

    #[serde(default = "default_true")]
    pub uppercase: bool,

    #[serde(default = "default_true")]
    pub lowercase: bool,

    #[serde(default = "default_true")]
    pub digits: bool,

    #[serde(default)]
    pub symbols: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_generator_length(),
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: false,
        }
    }
}

fn default_generator_length() -> usize {
    12
}

fn default_true() -> bool {
    true
}
