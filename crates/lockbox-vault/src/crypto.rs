// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open with a 128-bit IV.
//!
//! Platform AEAD APIs disagree on where the tag lives: some hand it back
//! detached, others append it to the ciphertext. Both shapes are wrapped in
//! [`CryptoProvider`], and every backend speaks the detached form
//! ([`SealedParts`]) so the envelope never depends on which one ran.

use std::sync::Arc;

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{Aead, AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, Key, Nonce, Tag};
use lockbox_config::AeadBackend;
use lockbox_core::CipherError;
use ring::rand::{SecureRandom, SystemRandom};
use zeroize::Zeroizing;

use crate::kdf::KEY_LEN;

/// IV length in bytes. Wider than the usual 96 bits, matching stored envelopes.
pub const IV_LEN: usize = 16;

/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;

/// AES-256-GCM with a 16-byte nonce and a 16-byte tag.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// Ciphertext and tag kept apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedParts {
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

/// An AES-256-GCM primitive. No associated data is ever used.
pub trait CryptoProvider: Send + Sync + 'static {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn seal(
        &self,
        key: &[u8; KEY_LEN],
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> Result<SealedParts, CipherError>;

    /// Verify the tag, then return the plaintext. Any mismatch is
    /// [`CipherError::AuthenticationFailure`].
    fn open(
        &self,
        key: &[u8; KEY_LEN],
        iv: &[u8; IV_LEN],
        sealed: &SealedParts,
    ) -> Result<Zeroizing<Vec<u8>>, CipherError>;
}

/// Backend whose primitive returns the tag separately.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedTagProvider;

impl CryptoProvider for DetachedTagProvider {
    fn name(&self) -> &'static str {
        "detached"
    }

    fn seal(
        &self,
        key: &[u8; KEY_LEN],
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> Result<SealedParts, CipherError> {
        let cipher = Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key));
        let mut buffer = plaintext.to_vec();
        let computed = cipher
            .encrypt_in_place_detached(Nonce::<U16>::from_slice(iv), b"", &mut buffer)
            .map_err(|_| too_long())?;
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&computed);
        Ok(SealedParts {
            ciphertext: buffer,
            tag,
        })
    }

    fn open(
        &self,
        key: &[u8; KEY_LEN],
        iv: &[u8; IV_LEN],
        sealed: &SealedParts,
    ) -> Result<Zeroizing<Vec<u8>>, CipherError> {
        let cipher = Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key));
        // The buffer holds keystream output even when the tag check fails.
        let mut buffer = Zeroizing::new(sealed.ciphertext.clone());
        cipher
            .decrypt_in_place_detached(
                Nonce::<U16>::from_slice(iv),
                b"",
                &mut buffer[..],
                Tag::<U16>::from_slice(&sealed.tag),
            )
            .map_err(|_| CipherError::AuthenticationFailure)?;
        Ok(buffer)
    }
}

/// Backend whose primitive works on `ciphertext || tag`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CombinedTagProvider;

impl CryptoProvider for CombinedTagProvider {
    fn name(&self) -> &'static str {
        "combined"
    }

    fn seal(
        &self,
        key: &[u8; KEY_LEN],
        iv: &[u8; IV_LEN],
        plaintext: &[u8],
    ) -> Result<SealedParts, CipherError> {
        let cipher = Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key));
        let mut combined = cipher
            .encrypt(Nonce::<U16>::from_slice(iv), plaintext)
            .map_err(|_| too_long())?;
        let split = combined.len().checked_sub(TAG_LEN).ok_or_else(too_long)?;
        let tag_bytes = combined.split_off(split);
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&tag_bytes);
        Ok(SealedParts {
            ciphertext: combined,
            tag,
        })
    }

    fn open(
        &self,
        key: &[u8; KEY_LEN],
        iv: &[u8; IV_LEN],
        sealed: &SealedParts,
    ) -> Result<Zeroizing<Vec<u8>>, CipherError> {
        let cipher = Aes256Gcm16::new(Key::<Aes256Gcm16>::from_slice(key));
        let mut combined = Vec::with_capacity(sealed.ciphertext.len() + TAG_LEN);
        combined.extend_from_slice(&sealed.ciphertext);
        combined.extend_from_slice(&sealed.tag);
        cipher
            .decrypt(Nonce::<U16>::from_slice(iv), combined.as_slice())
            .map(Zeroizing::new)
            .map_err(|_| CipherError::AuthenticationFailure)
    }
}

fn too_long() -> CipherError {
    CipherError::InvalidEnvelopeShape("plaintext exceeds the AES-GCM length limit".to_string())
}

/// Pick the backend named in configuration.
pub fn provider_for(backend: AeadBackend) -> Arc<dyn CryptoProvider> {
    match backend {
        AeadBackend::Detached => Arc::new(DetachedTagProvider),
        AeadBackend::Combined => Arc::new(CombinedTagProvider),
    }
}

/// Fill an `N`-byte array from the system CSPRNG.
pub fn random_array<const N: usize>() -> Result<[u8; N], CipherError> {
    let mut out = [0u8; N];
    SystemRandom::new()
        .fill(&mut out)
        .map_err(|_| CipherError::Randomness)?;
    Ok(out)
}

/// Generate a fresh random 32-byte master key.
pub fn generate_master_key() -> Result<Zeroizing<[u8; KEY_LEN]>, CipherError> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    SystemRandom::new()
        .fill(&mut key[..])
        .map_err(|_| CipherError::Randomness)?;
    Ok(key)
}
