// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random password generation from the OS CSPRNG.

use std::ops::RangeInclusive;

use lockbox_config::GeneratorConfig;
use lockbox_core::LockboxError;
use rand::rngs::OsRng;
use rand::Rng;
use zeroize::Zeroizing;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+[]{}<>?,.";

/// Allowed password lengths.
pub const LENGTH_RANGE: RangeInclusive<usize> = 4..=128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self::from(&GeneratorConfig::default())
    }
}

impl From<&GeneratorConfig> for GeneratorOptions {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            length: config.length,
            uppercase: config.uppercase,
            lowercase: config.lowercase,
            digits: config.digits,
            symbols: config.symbols,
        }
    }
}

impl GeneratorOptions {
    fn charset(&self) -> Vec<u8> {
        let mut charset = Vec::new();
        for (enabled, class) in [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.digits, DIGITS),
            (self.symbols, SYMBOLS),
        ] {
            if enabled {
                charset.extend_from_slice(class.as_bytes());
            }
        }
        charset
    }
}

/// Generate a password, each character drawn uniformly from the union of
/// the enabled classes.
pub fn generate_password(options: &GeneratorOptions) -> Result<Zeroizing<String>, LockboxError> {
    if !LENGTH_RANGE.contains(&options.length) {
        return Err(LockboxError::InvalidInput(format!(
            "password length must be between {} and {}, got {}",
            LENGTH_RANGE.start(),
            LENGTH_RANGE.end(),
            options.length
        )));
    }
    let charset = options.charset();
    if charset.is_empty() {
        return Err(LockboxError::InvalidInput(
            "select at least one character class".to_string(),
        ));
    }

    let mut rng = OsRng;
    let password = (0..options.length)
        .map(|_| char::from(charset[rng.gen_range(0..charset.len())]))
        .collect();
    Ok(Zeroizing::new(password))
}
