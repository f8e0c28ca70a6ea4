//! Insertion Order Module
//!
//! Tracks key insertion order for FIFO eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Tracks the order in which keys were first inserted.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest insertion
/// - Back = Newest insertion
///
/// Unlike an LRU tracker, re-inserting a known key does not move it.
#[derive(Debug)]
pub struct InsertionOrder<K> {
    /// Keys in insertion order, no duplicates
    order: VecDeque<K>,
}

impl<K: PartialEq> InsertionOrder<K> {
    // == Constructor ==
    /// Creates a new empty tracker with room for `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
        }
    }

    // == Push ==
    /// Appends a key as the newest insertion.
    ///
    /// Callers guarantee the key is not already tracked.
    pub fn push(&mut self, key: K) {
        debug_assert!(!self.contains(&key), "key tracked twice");
        self.order.push_back(key);
    }

    // == Evict Oldest ==
    /// Returns and removes the oldest inserted key.
    ///
    /// Returns None if tracker is empty.
    pub fn evict_oldest(&mut self) -> Option<K> {
        self.order.pop_front()
    }

    // == Peek Oldest ==
    /// Returns the oldest inserted key without removing it.
    pub fn peek_oldest(&self) -> Option<&K> {
        self.order.front()
    }

    /// Iterates keys from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
