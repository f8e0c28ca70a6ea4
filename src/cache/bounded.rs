//! Bounded Cache Module
//!
//! Fixed-capacity key/value memo cache with FIFO eviction of the oldest
//! inserted key.

use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::{CacheStats, InsertionOrder};
use crate::config::{Config, DEFAULT_CACHE_CAPACITY};
use crate::error::{Error, Result};

// == Bounded Cache ==
/// A small cache holding at most `capacity` entries.
///
/// Once the limit is exceeded by a new key, the key inserted first is evicted.
/// Overwriting a key keeps its place in the eviction order.
#[derive(Debug)]
pub struct BoundedCache<K, V> {
    /// Key-value storage
    entries: HashMap<K, V>,
    /// Insertion order of the keys in `entries`
    order: InsertionOrder<K>,
    /// Write statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    capacity: usize,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new cache holding at most `capacity` entries.
    ///
    /// A capacity of zero is rejected with [`Error::InvalidCapacity`].
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity(capacity));
        }

        Ok(Self {
            entries: HashMap::with_capacity(capacity + 1),
            order: InsertionOrder::with_capacity(capacity + 1),
            stats: CacheStats::new(),
            capacity,
        })
    }

    /// Creates a cache sized by the configured capacity.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.cache_capacity)
    }

    // == Has ==
    /// Returns true if `key` is currently cached.
    pub fn has(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    // == Get ==
    /// Returns the value cached for `key`, if any.
    ///
    /// Reads never affect eviction order.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    // == Put ==
    /// Stores a value under `key`.
    ///
    /// If the key already exists its value is overwritten in place.
    /// If the key is new and the cache is now over capacity, the oldest
    /// inserted entry is evicted and returned.
    pub fn put(&mut self, key: K, value: V) -> Option<(K, V)> {
        if let Some(slot) = self.entries.get_mut(&key) {
            *slot = value;
            self.stats.record_update();
            return None;
        }

        self.order.push(key.clone());
        self.entries.insert(key, value);
        self.stats.record_insert();

        let evicted = if self.order.len() > self.capacity {
            self.order.evict_oldest().and_then(|oldest| {
                self.stats.record_eviction();
                self.entries.remove_entry(&oldest)
            })
        } else {
            None
        };

        self.stats.set_total_entries(self.entries.len());
        evicted
    }

    // == Get Or Insert ==
    /// Returns the cached value for `key`, computing and storing it first
    /// when absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, compute: F) -> &V
    where
        F: FnOnce() -> V,
    {
        if !self.entries.contains_key(&key) {
            let value = compute();
            self.put(key.clone(), value);
        }
        &self.entries[&key]
    }

    /// Keys from oldest to newest insertion.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }
}

impl<K, V> Default for BoundedCache<K, V>
where
    K: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self {
            entries: HashMap::with_capacity(DEFAULT_CACHE_CAPACITY + 1),
            order: InsertionOrder::with_capacity(DEFAULT_CACHE_CAPACITY + 1),
            stats: CacheStats::new(),
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}
