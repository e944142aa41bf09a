// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password-based envelope encryption.
//!
//! `encrypt` draws a fresh salt and IV for every call, derives a key with
//! PBKDF2, and seals with AES-256-GCM. `decrypt` validates the envelope's
//! shape before running any primitive, so malformed input is distinguishable
//! from a wrong password.

use std::fmt;
use std::sync::Arc;

use lockbox_config::VaultConfig;
use lockbox_core::{CipherError, Envelope, LockboxError, ENVELOPE_ALGORITHM};
use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::{provider_for, random_array, CryptoProvider, SealedParts, IV_LEN, TAG_LEN};
use crate::kdf::{self, decode_lower_hex, SALT_LEN};

/// Encrypts and decrypts [`Envelope`]s with a configured AEAD backend.
#[derive(Clone)]
pub struct EnvelopeCipher {
    provider: Arc<dyn CryptoProvider>,
}

impl fmt::Debug for EnvelopeCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvelopeCipher")
            .field("provider", &self.provider.name())
            .finish()
    }
}

impl Default for EnvelopeCipher {
    fn default() -> Self {
        Self::from_config(&VaultConfig::default())
    }
}

impl EnvelopeCipher {
    pub fn new(provider: Arc<dyn CryptoProvider>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(provider_for(config.aead_backend))
    }

    /// Name of the AEAD backend in use.
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Encrypt `plaintext` under a key derived from `secret`.
    ///
    /// Two calls with the same inputs yield different envelopes.
    pub fn encrypt(&self, plaintext: &str, secret: &str) -> Result<Envelope, CipherError> {
        let salt: [u8; SALT_LEN] = random_array()?;
        let iv: [u8; IV_LEN] = random_array()?;
        let salt_hex = hex::encode(salt);

        let key = kdf::derive_key(secret, &salt_hex)?;
        let sealed = self.provider.seal(&key, &iv, plaintext.as_bytes())?;

        Ok(Envelope {
            ciphertext: hex::encode(&sealed.ciphertext),
            iv: hex::encode(iv),
            salt: salt_hex,
            tag: hex::encode(sealed.tag),
            algorithm: ENVELOPE_ALGORITHM.to_string(),
        })
    }

    /// Decrypt an envelope with `secret`.
    ///
    /// Shape problems fail with [`CipherError::InvalidEnvelopeShape`] before
    /// key derivation. A wrong secret and tampered data are the same
    /// [`CipherError::AuthenticationFailure`].
    pub fn decrypt(
        &self,
        envelope: &Envelope,
        secret: &str,
    ) -> Result<Zeroizing<String>, CipherError> {
        let parsed = parse_envelope(envelope)?;
        let key = kdf::derive_key(secret, &envelope.salt)
            .map_err(|e| CipherError::InvalidEnvelopeShape(e.to_string()))?;

        let plaintext = self.provider.open(&key, &parsed.iv, &parsed.sealed)?;
        let text = std::str::from_utf8(&plaintext).map_err(|_| CipherError::InvalidUtf8)?;
        Ok(Zeroizing::new(text.to_owned()))
    }

    /// [`encrypt`](Self::encrypt) on the blocking pool.
    pub async fn encrypt_async<P, S>(
        &self,
        plaintext: P,
        secret: S,
    ) -> Result<Envelope, LockboxError>
    where
        P: AsRef<str> + Send + 'static,
        S: AsRef<str> + Send + 'static,
    {
        let cipher = self.clone();
        tokio::task::spawn_blocking(move || cipher.encrypt(plaintext.as_ref(), secret.as_ref()))
            .await
            .map_err(|e| LockboxError::Internal(format!("encrypt task failed: {e}")))?
            .map_err(LockboxError::from)
    }

    /// [`decrypt`](Self::decrypt) on the blocking pool.
    ///
    /// Key derivation takes long enough that running it inline would stall
    /// the runtime.
    pub async fn decrypt_async<S>(
        &self,
        envelope: Envelope,
        secret: S,
    ) -> Result<Result<Zeroizing<String>, CipherError>, LockboxError>
    where
        S: AsRef<str> + Send + 'static,
    {
        let cipher = self.clone();
        let started = std::time::Instant::now();
        let result = tokio::task::spawn_blocking(move || cipher.decrypt(&envelope, secret.as_ref()))
            .await
            .map_err(|e| LockboxError::Internal(format!("decrypt task failed: {e}")))?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "envelope decrypted"
        );
        Ok(result)
    }
}

/// Envelope fields decoded to bytes.
struct ParsedEnvelope {
    iv: [u8; IV_LEN],
    sealed: SealedParts,
}

fn parse_envelope(envelope: &Envelope) -> Result<ParsedEnvelope, CipherError> {
    envelope.validate()?;

    let iv: [u8; IV_LEN] = decode_lower_hex(&envelope.iv).map_err(|e| shape("iv", e))?;
    let tag: [u8; TAG_LEN] = decode_lower_hex(&envelope.tag).map_err(|e| shape("tag", e))?;
    let ciphertext =
        hex::decode(&envelope.ciphertext).map_err(|e| shape("ciphertext", e.to_string()))?;

    Ok(ParsedEnvelope {
        iv,
        sealed: SealedParts { ciphertext, tag },
    })
}

fn shape(field: &str, reason: String) -> CipherError {
    CipherError::InvalidEnvelopeShape(format!("{field}: {reason}"))
}
