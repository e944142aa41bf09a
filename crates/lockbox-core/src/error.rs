// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for lockbox.

use thiserror::Error;

/// Failures raised by key derivation and the envelope cipher.
///
/// None of these variants ever carries plaintext or key material.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CipherError {
    /// A field is missing, has the wrong length or encoding, or the algorithm
    /// identifier does not match. Raised before any primitive runs.
    #[error("invalid envelope shape: {0}")]
    InvalidEnvelopeShape(String),

    /// The salt handed to key derivation is not 32 lowercase hex characters.
    #[error("invalid salt: {0}")]
    InvalidSalt(String),

    /// The AEAD tag did not verify (wrong password, or tampered data).
    #[error("authentication failed -- wrong password or corrupted data")]
    AuthenticationFailure,

    /// The authenticated plaintext is not valid UTF-8.
    #[error("decrypted value is not valid UTF-8")]
    InvalidUtf8,

    /// The system random generator could not produce bytes.
    #[error("failed to generate random bytes")]
    Randomness,
}

impl CipherError {
    /// True for malformed input rejected before any cryptographic work.
    ///
    /// `InvalidSalt` counts as a shape error at the cipher boundary.
    pub fn is_shape_error(&self) -> bool {
        matches!(self, Self::InvalidEnvelopeShape(_) | Self::InvalidSalt(_))
    }
}

/// The primary error type used across lockbox crates.
#[derive(Debug, Error)]
pub enum LockboxError {
    /// Configuration errors (invalid TOML, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Item store failures (I/O, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Envelope cipher failures.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// Login failed. A wrong password and an undecryptable master key are
    /// reported the same way.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No master key session is active.
    #[error("vault is locked")]
    Locked,

    /// The session was replaced while the operation was in flight.
    #[error("session was replaced while the operation was in flight")]
    SessionReplaced,

    /// A bulk reveal or hide is already running.
    #[error("a bulk reveal or hide is already in progress")]
    BulkInProgress,

    /// No item with the given id.
    #[error("item not found: {0}")]
    ItemNotFound(String),

    /// Caller-supplied input was rejected.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LockboxError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }
}
