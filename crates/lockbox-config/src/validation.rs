// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::LockboxConfig;

/// Accepted generator lengths.
pub const GENERATOR_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 4..=128;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &LockboxConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.vault.reveal_batch_size == 0 {
        errors.push(ConfigError::Validation {
            message: "vault.reveal_batch_size must be at least 1".to_string(),
        });
    }

    if config.vault.min_master_password_len == 0 {
        errors.push(ConfigError::Validation {
            message: "vault.min_master_password_len must be at least 1".to_string(),
        });
    }

    let generator = &config.generator;
    if !GENERATOR_LENGTH_RANGE.contains(&generator.length) {
        errors.push(ConfigError::Validation {
            message: format!(
                "generator.length must be between {} and {}, got {}",
                GENERATOR_LENGTH_RANGE.start(),
                GENERATOR_LENGTH_RANGE.end(),
                generator.length
            ),
        });
    }

    if !(generator.uppercase || generator.lowercase || generator.digits || generator.symbols) {
        errors.push(ConfigError::Validation {
            message: "generator must enable at least one character class".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
