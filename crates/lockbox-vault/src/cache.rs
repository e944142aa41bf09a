// SPDX-FileCopyrightText: 2026 Lockbox Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session memo of decrypted item secrets.
//!
//! Revealing and decrypting are separate: a decrypted value stays cached
//! while hidden, so re-revealing costs nothing. At most one decrypt per item
//! is ever in flight. A second request for the same item joins the first
//! instead of repeating key derivation.
//!
//! Decrypts run as spawned tasks so they finish (and fill the cache) even if
//! every caller stops waiting. A task only writes its result if its in-flight
//! marker is still current; invalidation and reconciliation remove markers,
//! so results computed under a replaced session are discarded.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use lockbox_core::{CipherError, ItemId, ItemState, LockboxError, VaultItem};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::cipher::EnvelopeCipher;
use crate::session::MasterKeySession;

/// A decrypted secret. Cheap to clone, zeroed when the last copy drops.
#[derive(Clone)]
pub struct Plaintext(Arc<Zeroizing<String>>);

impl Plaintext {
    pub fn new(value: Zeroizing<String>) -> Self {
        Self(Arc::new(value))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Plaintext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Plaintext([REDACTED])")
    }
}

/// What a reveal produced: the secret, or the error recorded in its place.
#[derive(Debug, Clone)]
pub enum Reveal {
    Plaintext(Plaintext),
    Errored(CipherError),
}

impl Reveal {
    pub fn plaintext(&self) -> Option<&str> {
        match self {
            Self::Plaintext(p) => Some(p.expose()),
            Self::Errored(_) => None,
        }
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, Self::Errored(_))
    }
}

#[derive(Clone)]
enum Outcome {
    Stored(Reveal),
    /// The marker was gone by the time the decrypt finished.
    Discarded,
    Failed(String),
}

type SharedDecrypt = Shared<BoxFuture<'static, Outcome>>;

struct CacheEntry {
    value: Reveal,
    revealed: bool,
}

struct Inflight {
    ticket: u64,
    reveal_on_complete: bool,
    future: SharedDecrypt,
}

#[derive(Default)]
struct CacheState {
    session: Option<Arc<MasterKeySession>>,
    epoch: u64,
    next_ticket: u64,
    entries: HashMap<ItemId, CacheEntry>,
    inflight: HashMap<ItemId, Inflight>,
}

/// Decryption cache bound to one master key session at a time.
pub struct DecryptionCache {
    cipher: EnvelopeCipher,
    state: Arc<Mutex<CacheState>>,
}

impl fmt::Debug for DecryptionCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DecryptionCache");
        s.field("cipher", &self.cipher);
        if let Ok(state) = self.state.lock() {
            s.field("entries", &state.entries.len())
                .field("inflight", &state.inflight.len())
                .field("epoch", &state.epoch);
        }
        s.finish()
    }
}

impl DecryptionCache {
    pub fn new(cipher: EnvelopeCipher) -> Self {
        Self {
            cipher,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheState>, LockboxError> {
        self.state
            .lock()
            .map_err(|_| LockboxError::Internal("decryption cache lock poisoned".to_string()))
    }

    /// Replace the active session. Always invalidates everything.
    pub fn set_session(&self, session: Option<Arc<MasterKeySession>>) -> Result<(), LockboxError> {
        let mut state = self.lock()?;
        invalidate(&mut state);
        debug!(
            session_id = session.as_ref().map(|s| s.id()),
            "decryption cache bound to new session"
        );
        state.session = session;
        Ok(())
    }

    pub fn session(&self) -> Result<Option<Arc<MasterKeySession>>, LockboxError> {
        Ok(self.lock()?.session.clone())
    }

    /// Counter bumped on every invalidation. Pair with
    /// [`store_plaintext_if_current`](Self::store_plaintext_if_current).
    pub fn epoch(&self) -> Result<u64, LockboxError> {
        Ok(self.lock()?.epoch)
    }

    /// Reveal an item, decrypting it only if nothing is cached yet.
    ///
    /// A decrypt failure is recorded as [`Reveal::Errored`] and returned as a
    /// value, not an error. Errored entries are not retried until the cache
    /// is invalidated or the item is updated.
    pub async fn reveal_one(&self, item: &VaultItem) -> Result<Reveal, LockboxError> {
        self.fetch(item, true).await
    }

    /// Like [`reveal_one`](Self::reveal_one) but leaves the revealed flag alone.
    pub async fn load(&self, item: &VaultItem) -> Result<Reveal, LockboxError> {
        self.fetch(item, false).await
    }

    async fn fetch(&self, item: &VaultItem, reveal: bool) -> Result<Reveal, LockboxError> {
        let (epoch, pending) = {
            let mut state = self.lock()?;
            if let Some(entry) = state.entries.get_mut(&item.id) {
                if reveal {
                    entry.revealed = true;
                }
                return Ok(entry.value.clone());
            }

            let epoch = state.epoch;
            if let Some(inflight) = state.inflight.get_mut(&item.id) {
                if reveal {
                    inflight.reveal_on_complete = true;
                }
                debug!(item_id = %item.id, "joining in-flight decrypt");
                (epoch, inflight.future.clone())
            } else {
                let session = state.session.clone().ok_or(LockboxError::Locked)?;
                (epoch, self.start_decrypt(&mut state, item, session, reveal))
            }
        };

        match pending.await {
            Outcome::Stored(value) => Ok(value),
            Outcome::Discarded => {
                let mut state = self.lock()?;
                if state.epoch != epoch {
                    return Err(LockboxError::SessionReplaced);
                }
                // A known plaintext may have replaced the decrypt.
                match state.entries.get_mut(&item.id) {
                    Some(entry) => {
                        if reveal {
                            entry.revealed = true;
                        }
                        Ok(entry.value.clone())
                    }
                    None => Err(LockboxError::ItemNotFound(item.id.to_string())),
                }
            }
            Outcome::Failed(reason) => Err(LockboxError::Internal(reason)),
        }
    }

    fn start_decrypt(
        &self,
        state: &mut CacheState,
        item: &VaultItem,
        session: Arc<MasterKeySession>,
        reveal: bool,
    ) -> SharedDecrypt {
        state.next_ticket += 1;
        let ticket = state.next_ticket;
        let id = item.id.clone();
        let envelope = item.encrypted.clone();
        let cipher = self.cipher.clone();
        let shared_state = Arc::clone(&self.state);

        debug!(item_id = %id, session_id = session.id(), "starting decrypt");
        let task = tokio::spawn(async move {
            let secret = session.item_secret();
            drop(session);
            let result = cipher.decrypt_async(envelope, secret).await;
            settle(&shared_state, &id, ticket, result)
        });

        let future = task
            .map(|joined| {
                joined.unwrap_or_else(|e| Outcome::Failed(format!("decrypt task failed: {e}")))
            })
            .boxed()
            .shared();

        state.inflight.insert(
            item.id.clone(),
            Inflight {
                ticket,
                reveal_on_complete: reveal,
                future: future.clone(),
            },
        );
        future
    }

    /// Hide an item. The plaintext stays cached.
    pub fn hide_one(&self, id: &ItemId) -> Result<(), LockboxError> {
        let mut state = self.lock()?;
        if let Some(entry) = state.entries.get_mut(id) {
            entry.revealed = false;
        }
        if let Some(inflight) = state.inflight.get_mut(id) {
            inflight.reveal_on_complete = false;
        }
        Ok(())
    }

    /// Hide every item without touching cached values.
    pub fn hide_all(&self) -> Result<(), LockboxError> {
        let mut state = self.lock()?;
        for entry in state.entries.values_mut() {
            entry.revealed = false;
        }
        for inflight in state.inflight.values_mut() {
            inflight.reveal_on_complete = false;
        }
        Ok(())
    }

    /// Drop every entry and abandon every in-flight decrypt.
    pub fn invalidate_all(&self) -> Result<(), LockboxError> {
        let mut state = self.lock()?;
        invalidate(&mut state);
        Ok(())
    }

    /// Drop entries for items no longer in `current`. Returns how many went.
    pub fn reconcile<'a, I>(&self, current: I) -> Result<usize, LockboxError>
    where
        I: IntoIterator<Item = &'a ItemId>,
    {
        let keep: HashSet<&ItemId> = current.into_iter().collect();
        let mut state = self.lock()?;
        let before = state.entries.len() + state.inflight.len();
        state.entries.retain(|id, _| keep.contains(id));
        state.inflight.retain(|id, _| keep.contains(id));
        let dropped = before - (state.entries.len() + state.inflight.len());
        if dropped > 0 {
            debug!(dropped, "reconciled decryption cache");
        }
        Ok(dropped)
    }

    /// Forget one item.
    pub fn remove(&self, id: &ItemId) -> Result<(), LockboxError> {
        let mut state = self.lock()?;
        state.entries.remove(id);
        state.inflight.remove(id);
        Ok(())
    }

    /// Store a plaintext the caller already knows, e.g. after creating or
    /// editing an item. Keeps the current revealed flag.
    pub fn store_plaintext(
        &self,
        id: &ItemId,
        plaintext: Zeroizing<String>,
    ) -> Result<(), LockboxError> {
        let mut state = self.lock()?;
        insert_known(&mut state, id, plaintext);
        Ok(())
    }

    /// [`store_plaintext`](Self::store_plaintext), but only while the cache
    /// is still at `epoch`. Returns whether the value was stored.
    pub fn store_plaintext_if_current(
        &self,
        id: &ItemId,
        plaintext: Zeroizing<String>,
        epoch: u64,
    ) -> Result<bool, LockboxError> {
        let mut state = self.lock()?;
        if state.epoch != epoch {
            debug!(
                item_id = %id,
                epoch,
                current = state.epoch,
                "dropping plaintext from old session"
            );
            return Ok(false);
        }
        insert_known(&mut state, id, plaintext);
        Ok(true)
    }

    pub fn state_of(&self, id: &ItemId) -> Result<ItemState, LockboxError> {
        let state = self.lock()?;
        if let Some(entry) = state.entries.get(id) {
            return Ok(match (&entry.value, entry.revealed) {
                (_, false) => ItemState::Hidden,
                (Reveal::Plaintext(_), true) => ItemState::Revealed,
                (Reveal::Errored(_), true) => ItemState::Errored,
            });
        }
        match state.inflight.get(id) {
            Some(inflight) if inflight.reveal_on_complete => Ok(ItemState::Decrypting),
            _ => Ok(ItemState::Hidden),
        }
    }

    /// The cached value, only if the item is currently revealed.
    pub fn revealed_value(&self, id: &ItemId) -> Result<Option<Reveal>, LockboxError> {
        let state = self.lock()?;
        Ok(state
            .entries
            .get(id)
            .filter(|e| e.revealed)
            .map(|e| e.value.clone()))
    }

    pub fn is_cached(&self, id: &ItemId) -> Result<bool, LockboxError> {
        Ok(self.lock()?.entries.contains_key(id))
    }

    pub fn cached_count(&self) -> Result<usize, LockboxError> {
        Ok(self.lock()?.entries.len())
    }

    pub fn revealed_count(&self) -> Result<usize, LockboxError> {
        Ok(self.lock()?.entries.values().filter(|e| e.revealed).count())
    }
}

fn insert_known(state: &mut CacheState, id: &ItemId, plaintext: Zeroizing<String>) {
    state.inflight.remove(id);
    let revealed = state.entries.get(id).is_some_and(|e| e.revealed);
    state.entries.insert(
        id.clone(),
        CacheEntry {
            value: Reveal::Plaintext(Plaintext::new(plaintext)),
            revealed,
        },
    );
}

fn invalidate(state: &mut CacheState) {
    let entries = state.entries.len();
    let inflight = state.inflight.len();
    state.entries.clear();
    state.inflight.clear();
    state.epoch += 1;
    debug!(entries, inflight, epoch = state.epoch, "decryption cache invalidated");
}

fn settle(
    shared: &Mutex<CacheState>,
    id: &ItemId,
    ticket: u64,
    result: Result<Result<Zeroizing<String>, CipherError>, LockboxError>,
) -> Outcome {
    let Ok(mut state) = shared.lock() else {
        return Outcome::Failed("decryption cache lock poisoned".to_string());
    };
    let current = state.inflight.get(id).is_some_and(|p| p.ticket == ticket);
    if !current {
        debug!(item_id = %id, "discarding stale decrypt result");
        return Outcome::Discarded;
    }
    let Some(inflight) = state.inflight.remove(id) else {
        return Outcome::Discarded;
    };

    let value = match result {
        Ok(Ok(plaintext)) => Reveal::Plaintext(Plaintext::new(plaintext)),
        Ok(Err(e)) => {
            warn!(item_id = %id, error = %e, "item decrypt failed");
            Reveal::Errored(e)
        }
        Err(e) => return Outcome::Failed(e.to_string()),
    };
    state.entries.insert(
        id.clone(),
        CacheEntry {
            value: value.clone(),
            revealed: inflight.reveal_on_complete,
        },
    );
    Outcome::Stored(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{CryptoProvider, DetachedTagProvider, SealedParts, IV_LEN};
    use crate::kdf::KEY_LEN;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        opens: AtomicUsize,
    }

    impl CryptoProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn seal(
            &self,
            key: &[u8; KEY_LEN],
            iv: &[u8; IV_LEN],
            plaintext: &[u8],
        ) -> Result<SealedParts, CipherError> {
            DetachedTagProvider.seal(key, iv, plaintext)
        }

        fn open(
            &self,
            key: &[u8; KEY_LEN],
            iv: &[u8; IV_LEN],
            sealed: &SealedParts,
        ) -> Result<Zeroizing<Vec<u8>>, CipherError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            DetachedTagProvider.open(key, iv, sealed)
        }
    }

    /// Blocks every `open` until the test releases it.
    struct GatedProvider {
        gate: std::sync::Mutex<std::sync::mpsc::Receiver<()>>,
    }

    impl CryptoProvider for GatedProvider {
        fn name(&self) -> &'static str {
            "gated"
        }

        fn seal(
            &self,
            key: &[u8; KEY_LEN],
            iv: &[u8; IV_LEN],
            plaintext: &[u8],
        ) -> Result<SealedParts, CipherError> {
            DetachedTagProvider.seal(key, iv, plaintext)
        }

        fn open(
            &self,
            key: &[u8; KEY_LEN],
            iv: &[u8; IV_LEN],
            sealed: &SealedParts,
        ) -> Result<Zeroizing<Vec<u8>>, CipherError> {
            let _ = self.gate.lock().unwrap().recv();
            DetachedTagProvider.open(key, iv, sealed)
        }
    }

    fn session() -> Arc<MasterKeySession> {
        Arc::new(MasterKeySession::from_key(Zeroizing::new([0x42; KEY_LEN])))
    }

    fn item(id: &str, secret: &str, session: &MasterKeySession) -> VaultItem {
        let now = Utc::now();
        VaultItem {
            id: ItemId::from(id),
            title: id.to_string(),
            username: None,
            url: None,
            notes: None,
            encrypted: session.seal_item(&EnvelopeCipher::default(), secret).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    fn counting_cache() -> (Arc<CountingProvider>, DecryptionCache) {
        let provider = Arc::new(CountingProvider::default());
        let cache = DecryptionCache::new(EnvelopeCipher::new(provider.clone()));
        (provider, cache)
    }

    #[tokio::test]
    async fn second_reveal_does_not_decrypt_again() {
        let (provider, cache) = counting_cache();
        let session = session();
        let item = item("a", "alpha", &session);
        cache.set_session(Some(session)).unwrap();

        let first = cache.reveal_one(&item).await.unwrap();
        let second = cache.reveal_one(&item).await.unwrap();

        assert_eq!(first.plaintext(), Some("alpha"));
        assert_eq!(second.plaintext(), Some("alpha"));
        assert_eq!(provider.opens.load(Ordering::SeqCst), 1);
        assert_eq!(cache.state_of(&item.id).unwrap(), ItemState::Revealed);
    }

    #[tokio::test]
    async fn hide_keeps_plaintext_for_instant_reveal() {
        let (provider, cache) = counting_cache();
        let session = session();
        let item = item("a", "alpha", &session);
        cache.set_session(Some(session)).unwrap();

        cache.reveal_one(&item).await.unwrap();
        cache.hide_one(&item.id).unwrap();
        assert_eq!(cache.state_of(&item.id).unwrap(), ItemState::Hidden);
        assert!(cache.is_cached(&item.id).unwrap());
        assert!(cache.revealed_value(&item.id).unwrap().is_none());

        cache.reveal_one(&item).await.unwrap();
        assert_eq!(provider.opens.load(Ordering::SeqCst), 1);
        assert_eq!(cache.revealed_count().unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_reveals_share_one_decrypt() {
        let (provider, cache) = counting_cache();
        let session = session();
        let item = item("a", "alpha", &session);
        cache.set_session(Some(session)).unwrap();

        let (a, b, c) = tokio::join!(
            cache.reveal_one(&item),
            cache.reveal_one(&item),
            cache.reveal_one(&item)
        );
        for reveal in [a, b, c] {
            assert_eq!(reveal.unwrap().plaintext(), Some("alpha"));
        }
        assert_eq!(provider.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn session_change_forces_fresh_decrypt() {
        let (provider, cache) = counting_cache();
        let session = session();
        let item = item("a", "alpha", &session);
        cache.set_session(Some(Arc::clone(&session))).unwrap();

        cache.reveal_one(&item).await.unwrap();
        cache.set_session(Some(session)).unwrap();
        assert_eq!(cache.cached_count().unwrap(), 0);

        cache.reveal_one(&item).await.unwrap();
        assert_eq!(provider.opens.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn corrupted_item_is_recorded_and_sticky() {
        let (provider, cache) = counting_cache();
        let session = session();
        let mut item = item("bad", "beta", &session);
        item.encrypted.ciphertext = "00".repeat(4);
        cache.set_session(Some(session)).unwrap();

        let reveal = cache.reveal_one(&item).await.unwrap();
        assert!(matches!(reveal, Reveal::Errored(CipherError::AuthenticationFailure)));
        assert_eq!(cache.state_of(&item.id).unwrap(), ItemState::Errored);

        cache.reveal_one(&item).await.unwrap();
        assert_eq!(provider.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_envelope_is_errored_without_decrypt() {
        let (provider, cache) = counting_cache();
        let session = session();
        let mut item = item("bad", "beta", &session);
        item.encrypted.iv = "short".into();
        cache.set_session(Some(session)).unwrap();

        let reveal = cache.reveal_one(&item).await.unwrap();
        assert!(matches!(reveal, Reveal::Errored(ref e) if e.is_shape_error()));
        assert_eq!(provider.opens.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reveal_without_session_is_locked() {
        let (_, cache) = counting_cache();
        let item = item("a", "alpha", &session());
        let err = cache.reveal_one(&item).await.unwrap_err();
        assert!(matches!(err, LockboxError::Locked));
    }

    #[tokio::test]
    async fn load_does_not_reveal() {
        let (_, cache) = counting_cache();
        let session = session();
        let item = item("a", "alpha", &session);
        cache.set_session(Some(session)).unwrap();

        let loaded = cache.load(&item).await.unwrap();
        assert_eq!(loaded.plaintext(), Some("alpha"));
        assert_eq!(cache.state_of(&item.id).unwrap(), ItemState::Hidden);
        assert!(cache.is_cached(&item.id).unwrap());
    }

    #[tokio::test]
    async fn reconcile_drops_missing_items() {
        let (_, cache) = counting_cache();
        let session = session();
        let a = item("a", "alpha", &session);
        let b = item("b", "beta", &session);
        cache.set_session(Some(session)).unwrap();
        cache.reveal_one(&a).await.unwrap();
        cache.reveal_one(&b).await.unwrap();

        let dropped = cache.reconcile([&a.id]).unwrap();
        assert_eq!(dropped, 1);
        assert!(cache.is_cached(&a.id).unwrap());
        assert!(!cache.is_cached(&b.id).unwrap());
    }

    #[tokio::test]
    async fn stored_plaintext_replaces_entry() {
        let (provider, cache) = counting_cache();
        let session = session();
        let item = item("a", "alpha", &session);
        cache.set_session(Some(session)).unwrap();

        cache.reveal_one(&item).await.unwrap();
        cache
            .store_plaintext(&item.id, Zeroizing::new("omega".to_string()))
            .unwrap();
        let value = cache.revealed_value(&item.id).unwrap().unwrap();
        assert_eq!(value.plaintext(), Some("omega"));
        assert_eq!(provider.opens.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn result_under_replaced_session_is_discarded() {
        let (release, gate) = std::sync::mpsc::channel();
        let provider = Arc::new(GatedProvider {
            gate: std::sync::Mutex::new(gate),
        });
        let cache = Arc::new(DecryptionCache::new(EnvelopeCipher::new(provider)));
        let session = session();
        let item = item("a", "alpha", &session);
        cache.set_session(Some(Arc::clone(&session))).unwrap();

        let pending = {
            let cache = Arc::clone(&cache);
            let item = item.clone();
            tokio::spawn(async move { cache.reveal_one(&item).await })
        };
        while cache.state_of(&item.id).unwrap() != ItemState::Decrypting {
            tokio::task::yield_now().await;
        }

        cache.set_session(Some(session)).unwrap();
        release.send(()).unwrap();

        let err = pending.await.unwrap().unwrap_err();
        assert!(matches!(err, LockboxError::SessionReplaced));
        assert!(!cache.is_cached(&item.id).unwrap());
        assert_eq!(cache.state_of(&item.id).unwrap(), ItemState::Hidden);
    }

    #[tokio::test]
    async fn invalidate_all_clears_entries_and_bumps_epoch() {
        let (provider, cache) = counting_cache();
        let session = session();
        let item = item("a", "alpha", &session);
        cache.set_session(Some(session)).unwrap();
        cache.reveal_one(&item).await.unwrap();
        let epoch = cache.epoch().unwrap();

        cache.invalidate_all().unwrap();
        assert_eq!(cache.cached_count().unwrap(), 0);
        assert_eq!(cache.epoch().unwrap(), epoch + 1);

        cache.reveal_one(&item).await.unwrap();
        assert_eq!(provider.opens.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn joiner_gets_plaintext_stored_during_decrypt() {
        let (release, gate) = std::sync::mpsc::channel();
        let provider = Arc::new(GatedProvider {
            gate: std::sync::Mutex::new(gate),
        });
        let cache = Arc::new(DecryptionCache::new(EnvelopeCipher::new(provider)));
        let session = session();
        let item = item("a", "alpha", &session);
        cache.set_session(Some(session)).unwrap();

        let pending = {
            let cache = Arc::clone(&cache);
            let item = item.clone();
            tokio::spawn(async move { cache.reveal_one(&item).await })
        };
        while cache.state_of(&item.id).unwrap() != ItemState::Decrypting {
            tokio::task::yield_now().await;
        }

        cache
            .store_plaintext(&item.id, Zeroizing::new("omega".to_string()))
            .unwrap();
        release.send(()).unwrap();

        let reveal = pending.await.unwrap().unwrap();
        assert_eq!(reveal.plaintext(), Some("omega"));
        assert_eq!(cache.state_of(&item.id).unwrap(), ItemState::Revealed);
    }

    #[tokio::test]
    async fn conditional_store_is_dropped_after_session_change() {
        let (_, cache) = counting_cache();
        let session = session();
        let id = ItemId::from("a");
        cache.set_session(Some(Arc::clone(&session))).unwrap();
        let epoch = cache.epoch().unwrap();

        cache.set_session(Some(session)).unwrap();
        let stored = cache
            .store_plaintext_if_current(&id, Zeroizing::new("stale".to_string()), epoch)
            .unwrap();
        assert!(!stored);
        assert!(!cache.is_cached(&id).unwrap());

        let stored = cache
            .store_plaintext_if_current(&id, Zeroizing::new("fresh".to_string()), epoch + 1)
            .unwrap();
        assert!(stored);
        assert!(cache.is_cached(&id).unwrap());
    }

    #[test]
    fn plaintext_debug_is_redacted() {
        let p = Plaintext::new(Zeroizing::new("hunter2".to_string()));
        assert!(!format!("{p:?}").contains("hunter2"));
        assert_eq!(p.expose(), "hunter2");
    }
}
