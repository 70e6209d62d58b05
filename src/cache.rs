//! Keyed instance cache
//!
//! [`InstanceCache`] hands out one shared instance per key, creating it on
//! first request. Entries are never evicted: the cache is meant for a small,
//! bounded key space (one instance per configuration, per zone, per locale)
//! and typically lives in a process-wide `static`.
//!
//! # Example
//!
//! ```rust
//! use bulwark::cache::InstanceCache;
//! use bulwark::predicate::{in_range, BoxedPredicate, Predicate};
//! use std::sync::{Arc, LazyLock};
//!
//! static RANGES: LazyLock<InstanceCache<(i64, i64), BoxedPredicate<i64>>> =
//!     LazyLock::new(InstanceCache::new);
//!
//! let percent = RANGES.get_or_create((0, 100), |&(lo, hi)| BoxedPredicate::new(in_range(lo, hi)));
//! let again = RANGES.get_or_create((0, 100), |_| unreachable!());
//!
//! assert!(Arc::ptr_eq(&percent, &again));
//! assert!(percent.check(&42));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;

/// Thread-safe, lazily populated, never-evicting map from keys to shared
/// instances.
pub struct InstanceCache<K, V> {
    entries: RwLock<HashMap<K, Arc<V>>>,
}

impl<K: Hash + Eq, V> InstanceCache<K, V> {
    /// Create an empty cache.
    pub fn new() -> Self {
        InstanceCache {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The cached instance for `key`, if one was created.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.entries.read().get(key).cloned()
    }

    /// The instance for `key`, creating it with `init` on first request.
    ///
    /// `init` runs without the lock held. When two threads miss on the same
    /// key at once both may run `init`, but only the first instance stored
    /// is ever returned.
    pub fn get_or_create<F>(&self, key: K, init: F) -> Arc<V>
    where
        F: FnOnce(&K) -> V,
    {
        if let Some(found) = self.get(&key) {
            return found;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(cached = self.len(), "instance cache miss");

        let created = Arc::new(init(&key));
        self.entries.write().entry(key).or_insert(created).clone()
    }

    /// Like [`get_or_create`](Self::get_or_create) for a fallible `init`.
    ///
    /// A failed creation caches nothing.
    pub fn try_get_or_create<F, E>(&self, key: K, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        if let Some(found) = self.get(&key) {
            return Ok(found);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(cached = self.len(), "instance cache miss");

        let created = Arc::new(init(&key)?);
        Ok(self.entries.write().entry(key).or_insert(created).clone())
    }

    /// Whether an instance exists for `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Number of cached instances.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<K: Hash + Eq, V> Default for InstanceCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for InstanceCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceCache")
            .field("len", &self.entries.read().len())
            .finish()
    }
}
