// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via the LOCKBOX_MASTER_PASSWORD environment
//! variable or a TTY prompt.

use std::io::IsTerminal;

use lockbox_core::LockboxError;
use secrecy::SecretString;

/// The environment variable that supplies the master password.
pub const MASTER_PASSWORD_ENV_VAR: &str = "LOCKBOX_MASTER_PASSWORD";

/// Get the master password from the environment or an interactive prompt.
///
/// The environment variable wins when set and non-empty, which is how
/// scripts and tests drive the CLI.
pub fn get_master_password() -> Result<SecretString, LockboxError> {
    if let Some(password) = from_env() {
        return Ok(password);
    }

    if std::io::stdin().is_terminal() {
        let password = read("Master password: ")?;
        if password.is_empty() {
            return Err(LockboxError::InvalidInput("empty master password".to_string()));
        }
        return Ok(SecretString::from(password));
    }

    Err(no_password())
}

/// Like [`get_master_password`], but prompts twice and requires a match.
/// Used when creating a vault.
pub fn get_master_password_with_confirm() -> Result<SecretString, LockboxError> {
    if let Some(password) = from_env() {
        return Ok(password);
    }

    if std::io::stdin().is_terminal() {
        let first = read("New master password: ")?;
        let second = read("Confirm master password: ")?;
        if first != second {
            return Err(LockboxError::InvalidInput("passwords do not match".to_string()));
        }
        if first.is_empty() {
            return Err(LockboxError::InvalidInput("empty master password".to_string()));
        }
        return Ok(SecretString::from(first));
    }

    Err(no_password())
}

/// Prompt for an arbitrary secret value without echo.
pub fn prompt_secret(label: &str) -> Result<SecretString, LockboxError> {
    if !std::io::stdin().is_terminal() {
        return Err(LockboxError::InvalidInput(format!(
            "{label} must be entered interactively"
        )));
    }
    read(&format!("{label}: ")).map(SecretString::from)
}

fn from_env() -> Option<SecretString> {
    std::env::var(MASTER_PASSWORD_ENV_VAR)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

fn read(prompt: &str) -> Result<String, LockboxError> {
    rpassword::prompt_password(prompt)
        .map_err(|e| LockboxError::InvalidInput(format!("failed to read password: {e}")))
}

fn no_password() -> LockboxError {
    LockboxError::InvalidInput(format!(
        "no master password provided; set {MASTER_PASSWORD_ENV_VAR} or run interactively"
    ))
}
