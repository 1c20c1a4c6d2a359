//! Sync Map Module
//!
//! A plain thread-safe key-value map for callers that do not need
//! expiration: no last-access tracking, no background reclamation, just
//! mutex discipline around a `HashMap`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// == Sync Map ==
/// A mutex-guarded key-value map. Handles are cheap to clone and share
/// the same underlying storage.
#[derive(Debug)]
pub struct SyncMap<K, V> {
    inner: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Clone for SyncMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for SyncMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SyncMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a new empty map.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a clone of the value stored for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        self.lock().get(key).cloned()
    }

    /// Stores a value for a key, overwriting any previous value.
    pub fn set(&self, key: K, value: V) {
        self.lock().insert(key, value);
    }

    /// Removes a key. No-op when absent.
    pub fn del(&self, key: &K) {
        self.lock().remove(key);
    }

    /// Returns true if the key is present.
    pub fn has(&self, key: &K) -> bool {
        self.lock().contains_key(key)
    }

    /// Visits every key-value pair. Returning `false` from the callback
    /// stops the scan.
    ///
    /// Unlike [`CacheMap::for_each`](crate::cache::CacheMap::for_each),
    /// the lock is held for the whole scan; the callback must not call
    /// back into the same map.
    pub fn for_each<F>(&self, mut cb: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        for (key, value) in self.lock().iter() {
            if !cb(key, value) {
                break;
            }
        }
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_del() {
        let map: SyncMap<String, u32> = SyncMap::new();

        map.set("a".to_string(), 1);
        assert_eq!(map.get(&"a".to_string()), Some(1));
        assert!(map.has(&"a".to_string()));

        map.del(&"a".to_string());
        assert_eq!(map.get(&"a".to_string()), None);
        assert!(!map.has(&"a".to_string()));
        assert!(map.is_empty());
    }

    #[test]
    fn test_overwrite() {
        let map: SyncMap<String, u32> = SyncMap::new();
        map.set("a".to_string(), 1);
        map.set("a".to_string(), 2);
        assert_eq!(map.get(&"a".to_string()), Some(2));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_for_each_early_stop() {
        let map: SyncMap<u32, u32> = SyncMap::new();
        for i in 0..5 {
            map.set(i, i * 10);
        }

        let mut calls = 0;
        map.for_each(|_, _| {
            calls += 1;
            calls < 3
        });
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_handles_share_state_across_threads() {
        let map: SyncMap<String, u32> = SyncMap::new();
        let mut handles = Vec::new();

        for t in 0..4u32 {
            let map = map.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..25 {
                    map.set(format!("t{t}-{i}"), i);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(map.len(), 100);
    }
}
