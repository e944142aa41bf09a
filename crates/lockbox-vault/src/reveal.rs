// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reveal-all and hide-all over the whole item set.
//!
//! Uncached items decrypt in fixed-size batches. Batches run one after
//! another; items within a batch decrypt concurrently. A failing item is
//! recorded and the batch carries on.

use std::sync::{Arc, Mutex};

use futures::future::join_all;
use lockbox_core::{ItemId, LockboxError, VaultItem};
use tracing::{debug, info, warn};

use crate::cache::{DecryptionCache, Reveal};

/// Default number of concurrent decrypts per batch.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Whole-vault display phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkPhase {
    Hidden,
    Revealing,
    Revealed,
    Hiding,
}

/// What a reveal-all did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BulkReport {
    /// Items now showing their plaintext.
    pub revealed: Vec<ItemId>,
    /// Items whose decrypt failed; they show an error instead.
    pub errored: Vec<ItemId>,
    /// Items that could not be processed at all (e.g. session replaced).
    pub skipped: Vec<ItemId>,
    /// How many items needed decryption.
    pub decrypted: usize,
    /// How many batches ran.
    pub batches: usize,
}

/// Result of a toggle-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkToggle {
    Revealed(BulkReport),
    Hidden,
}

/// Drives [`BulkPhase`] transitions on top of a [`DecryptionCache`].
#[derive(Debug)]
pub struct BulkRevealController {
    cache: Arc<DecryptionCache>,
    batch_size: usize,
    phase: Mutex<BulkPhase>,
}

/// Restores a fallback phase if a bulk operation is abandoned midway.
struct PhaseGuard<'a> {
    phase: &'a Mutex<BulkPhase>,
    fallback: BulkPhase,
    armed: bool,
}

impl PhaseGuard<'_> {
    fn finish(mut self, phase: BulkPhase) {
        self.armed = false;
        if let Ok(mut current) = self.phase.lock() {
            *current = phase;
        }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Ok(mut current) = self.phase.lock() {
                *current = self.fallback;
            }
        }
    }
}

impl BulkRevealController {
    pub fn new(cache: Arc<DecryptionCache>, batch_size: usize) -> Self {
        Self {
            cache,
            batch_size: batch_size.max(1),
            phase: Mutex::new(BulkPhase::Hidden),
        }
    }

    pub fn phase(&self) -> BulkPhase {
        self.phase.lock().map(|p| *p).unwrap_or(BulkPhase::Hidden)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn enter(&self, next: BulkPhase) -> Result<PhaseGuard<'_>, LockboxError> {
        let mut current = self
            .phase
            .lock()
            .map_err(|_| LockboxError::Internal("bulk phase lock poisoned".to_string()))?;
        if matches!(*current, BulkPhase::Revealing | BulkPhase::Hiding) {
            return Err(LockboxError::BulkInProgress);
        }
        let fallback = *current;
        *current = next;
        Ok(PhaseGuard {
            phase: &self.phase,
            fallback,
            armed: true,
        })
    }

    /// Reveal every item in `items`.
    ///
    /// Per-item decrypt failures end up in [`BulkReport::errored`] and never
    /// fail the call. Fails with [`LockboxError::Locked`] if there is no
    /// session and [`LockboxError::BulkInProgress`] if another bulk operation
    /// is running.
    pub async fn reveal_all(&self, items: &[VaultItem]) -> Result<BulkReport, LockboxError> {
        let guard = self.enter(BulkPhase::Revealing)?;
        if self.cache.session()?.is_none() {
            return Err(LockboxError::Locked);
        }

        let mut cached = Vec::new();
        let mut pending = Vec::new();
        for item in items {
            if self.cache.is_cached(&item.id)? {
                cached.push(item);
            } else {
                pending.push(item);
            }
        }

        let mut report = BulkReport {
            decrypted: pending.len(),
            ..BulkReport::default()
        };
        debug!(
            cached = cached.len(),
            pending = pending.len(),
            batch_size = self.batch_size,
            "reveal-all started"
        );

        for batch in pending.chunks(self.batch_size) {
            let results = join_all(batch.iter().map(|item| self.cache.reveal_one(item))).await;
            for (item, result) in batch.iter().zip(results) {
                record(&mut report, item, result);
            }
            report.batches += 1;
        }

        for item in cached {
            let result = self.cache.reveal_one(item).await;
            record(&mut report, item, result);
        }

        info!(
            revealed = report.revealed.len(),
            errored = report.errored.len(),
            skipped = report.skipped.len(),
            batches = report.batches,
            "reveal-all finished"
        );
        guard.finish(BulkPhase::Revealed);
        Ok(report)
    }

    /// Hide every item. Cached plaintexts stay.
    pub fn hide_all(&self) -> Result<(), LockboxError> {
        let guard = self.enter(BulkPhase::Hiding)?;
        self.cache.hide_all()?;
        guard.finish(BulkPhase::Hidden);
        debug!("hide-all finished");
        Ok(())
    }

    /// Hide everything if anything is revealed, otherwise reveal everything.
    pub async fn toggle_all(&self, items: &[VaultItem]) -> Result<BulkToggle, LockboxError> {
        if self.cache.revealed_count()? > 0 {
            self.hide_all()?;
            Ok(BulkToggle::Hidden)
        } else {
            self.reveal_all(items).await.map(BulkToggle::Revealed)
        }
    }
}

fn record(report: &mut BulkReport, item: &VaultItem, result: Result<Reveal, LockboxError>) {
    match result {
        Ok(Reveal::Plaintext(_)) => report.revealed.push(item.id.clone()),
        Ok(Reveal::Errored(_)) => report.errored.push(item.id.clone()),
        Err(e) => {
            warn!(item_id = %item.id, error = %e, "item skipped during reveal-all");
            report.skipped.push(item.id.clone());
        }
    }
}
