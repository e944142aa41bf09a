// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lockbox generate` command implementation.

use lockbox_config::GeneratorConfig;
use lockbox_core::LockboxError;
use lockbox_vault::{generate_password, GeneratorOptions};

/// Command-line overrides on top of the `[generator]` config section.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOverrides {
    pub length: Option<usize>,
    pub no_uppercase: bool,
    pub no_lowercase: bool,
    pub no_digits: bool,
    pub symbols: bool,
}

impl GenerateOverrides {
    fn apply(self, config: &GeneratorConfig) -> GeneratorOptions {
        let mut options = GeneratorOptions::from(config);
        if let Some(length) = self.length {
            options.length = length;
        }
        options.uppercase &= !self.no_uppercase;
        options.lowercase &= !self.no_lowercase;
        options.digits &= !self.no_digits;
        options.symbols |= self.symbols;
        options
    }
}

pub fn run_generate(
    overrides: GenerateOverrides,
    config: &GeneratorConfig,
) -> Result<(), LockboxError> {
    let password = generate_password(&overrides.apply(config))?;
    println!("{}", password.as_str());
    Ok(())
}
