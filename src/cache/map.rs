//! Cache Map Module
//!
//! Main cache engine: a mutex-guarded map from keys to value-or-error slots
//! with last-access tracking and idle-time eviction.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::cache::{CacheEntry, CacheStats};

// == Inner State ==
/// State behind the cache mutex.
#[derive(Debug)]
struct MapInner<K, V, E> {
    /// Key to entry storage
    entries: HashMap<K, CacheEntry<V, E>>,
    /// Default idle-time threshold for reclamation and inline expiry
    expiration: Duration,
    /// Performance statistics
    stats: CacheStats,
}

// == Cache Map ==
/// An expiring cache map holding one value-or-error per key.
///
/// Every operation takes a single coarse mutex; there is no reader/writer
/// split. Handles are cheap to clone and share the same underlying map,
/// which is how the background reclaim task and callers coexist.
///
/// Lookups and writes refresh an entry's last-access time; entries are
/// only removed by [`del`](CacheMap::del), by [`del_old`](CacheMap::del_old),
/// or inline during [`for_each`](CacheMap::for_each) when found idle past
/// the configured expiration.
#[derive(Debug)]
pub struct CacheMap<K, V, E> {
    inner: Arc<Mutex<MapInner<K, V, E>>>,
}

impl<K, V, E> Clone for CacheMap<K, V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Outcome of inspecting one key during a `for_each` scan.
enum Visit<V> {
    /// Entry holds a live value; run the callback on it
    Value(V),
    /// Entry is gone, errored, or a reservation; move on
    Skip,
}

impl<K, V, E> CacheMap<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
    E: Clone,
{
    // == Constructor ==
    /// Creates a new cache map with the given default expiration.
    ///
    /// The expiration is the idle-time threshold used by background
    /// reclamation and by inline expiry during iteration. A zero duration
    /// disables both. No background task is started here; see
    /// [`spawn_reclaim_task`](crate::tasks::spawn_reclaim_task) and
    /// [`Reclaimer`](crate::tasks::Reclaimer).
    pub fn new(expiration: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MapInner {
                entries: HashMap::new(),
                expiration,
                stats: CacheStats::new(),
            })),
        }
    }

    /// Acquires the cache mutex, recovering a poisoned lock.
    ///
    /// The map holds cached data only, so a panic in another thread leaves
    /// nothing worth refusing to read.
    fn lock(&self) -> MutexGuard<'_, MapInner<K, V, E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Get ==
    /// Looks up a key, refreshing its last-access time.
    ///
    /// Returns `Some(Ok(value))` for a stored value, `Some(Err(err))` for a
    /// stored error, and `None` when the key is absent (touch-only
    /// reservations count as absent).
    pub fn get(&self, key: &K) -> Option<Result<V, E>> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        let outcome = match inner.entries.get_mut(key) {
            Some(entry) if entry.slot.is_some() => {
                entry.touch();
                entry.slot.clone()
            }
            _ => None,
        };

        if outcome.is_some() {
            inner.stats.record_hit();
        } else {
            inner.stats.record_miss();
        }
        outcome
    }

    // == Set ==
    /// Stores a value (`Ok`) or an error (`Err`) for a key.
    ///
    /// Overwrites unconditionally: a stored value replaces a stored error
    /// and vice versa, so at most one of the two exists per key. The
    /// last-access time is reset. There is no compare-and-swap and no
    /// "already computed" short-circuit; callers needing single-flight
    /// behavior must coordinate externally.
    pub fn set(&self, key: K, outcome: Result<V, E>) {
        let mut inner = self.lock();
        inner.entries.insert(key, CacheEntry::new(outcome));
    }

    // == Has ==
    /// Returns true if a key holds a value (not a stored error).
    ///
    /// Refreshes the last-access time of any populated slot it finds, the
    /// stored-error case included.
    pub fn has(&self, key: &K) -> bool {
        let mut inner = self.lock();
        match inner.entries.get_mut(key) {
            Some(entry) if entry.slot.is_some() => {
                entry.touch();
                entry.has_value()
            }
            _ => false,
        }
    }

    // == Delete ==
    /// Removes a key with its value or stored error. No-op when absent.
    pub fn del(&self, key: &K) {
        let mut inner = self.lock();
        inner.entries.remove(key);
    }

    // == Touch ==
    /// Refreshes a key's last-access time.
    ///
    /// If the key is absent, a reservation entry is created: it holds no
    /// value, is invisible to `get`/`has`/`for_each`, but keeps its
    /// last-access time and so survives `del_old` like any live entry.
    pub fn touch(&self, key: K) {
        let mut inner = self.lock();
        inner
            .entries
            .entry(key)
            .and_modify(|entry| entry.touch())
            .or_insert_with(CacheEntry::reservation);
    }

    // == Expire ==
    /// Replaces the default expiration threshold.
    ///
    /// Affects future reclamation passes and inline expiry only; nothing
    /// is evicted retroactively.
    pub fn expire(&self, expiration: Duration) {
        let mut inner = self.lock();
        inner.expiration = expiration;
    }

    /// Returns the current default expiration threshold.
    pub fn expiration(&self) -> Duration {
        self.lock().expiration
    }

    // == Delete Old ==
    /// Removes every entry idle for longer than `threshold` and returns
    /// the number removed.
    ///
    /// A zero threshold clears the cache unconditionally; the reclaim task
    /// uses that as the last resort under critical memory pressure.
    pub fn del_old(&self, threshold: Duration) -> usize {
        let mut inner = self.lock();
        let before = inner.entries.len();

        if threshold.is_zero() {
            inner.entries.clear();
        } else {
            inner
                .entries
                .retain(|_, entry| !entry.idle_longer_than(threshold));
        }

        let removed = before - inner.entries.len();
        inner.stats.record_evictions(removed as u64);
        removed
    }

    // == For Each ==
    /// Visits every key currently holding a value.
    ///
    /// Keys are snapshotted under the lock, then visited one at a time with
    /// the lock released around the callback, so the callback may call back
    /// into this cache without deadlocking. The price is staleness: a key
    /// deleted after the snapshot is silently skipped.
    ///
    /// Stored-error entries are skipped (their last-access time is
    /// refreshed). Entries found idle past the current expiration are
    /// evicted inline, unless the expiration is zero. Returning `false`
    /// from the callback stops the scan.
    pub fn for_each<F>(&self, cb: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.scan(cb, false)
    }

    /// Like [`for_each`](CacheMap::for_each), but also refreshes the
    /// last-access time of each visited value.
    pub fn for_each_touch<F>(&self, cb: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.scan(cb, true)
    }

    fn scan<F>(&self, mut cb: F, touch: bool)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let keys: Vec<K> = {
            let inner = self.lock();
            inner
                .entries
                .iter()
                .filter(|(_, entry)| entry.slot.is_some())
                .map(|(key, _)| key.clone())
                .collect()
        };

        for key in keys {
            let visit = {
                let mut guard = self.lock();
                let inner = &mut *guard;
                let expiration = inner.expiration;

                let mut expired = false;
                let visit = match inner.entries.get_mut(&key) {
                    None => Visit::Skip,
                    Some(entry) if entry.has_err() => {
                        entry.touch();
                        Visit::Skip
                    }
                    Some(entry) if entry.idle_longer_than(expiration) => {
                        expired = true;
                        Visit::Skip
                    }
                    Some(entry) => {
                        if touch {
                            entry.touch();
                        }
                        match &entry.slot {
                            Some(Ok(value)) => Visit::Value(value.clone()),
                            _ => Visit::Skip,
                        }
                    }
                };

                if expired {
                    inner.entries.remove(&key);
                    inner.stats.record_evictions(1);
                }
                visit
            };

            if let Visit::Value(value) = visit {
                if !cb(&key, &value) {
                    break;
                }
            }
        }
    }

    // == Length ==
    /// Returns the current number of entries, reservations included.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let mut stats = inner.stats.clone();
        stats.set_entries(inner.entries.len());
        stats
    }
}
