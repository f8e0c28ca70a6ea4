//! Cache Statistics Module
//!
//! Tracks write-side cache metrics: inserts, in-place updates and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache write metrics.
///
/// Reads never change a cache, so there are no hit or miss counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of puts that added a new key
    pub inserts: u64,
    /// Number of puts that overwrote an existing key
    pub updates: u64,
    /// Number of entries evicted by the FIFO policy
    pub evictions: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Eviction Rate ==
    /// Fraction of inserts that pushed an older entry out.
    ///
    /// Returns 0.0 if nothing has been inserted yet.
    pub fn eviction_rate(&self) -> f64 {
        if self.inserts == 0 {
            0.0
        } else {
            self.evictions as f64 / self.inserts as f64
        }
    }

    pub fn record_insert(&mut self) {
        self.inserts += 1;
    }

    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
