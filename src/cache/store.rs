//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking and TTL expiration.
//!
//! The store never fails: absence is `None`. It performs no locking of its own;
//! callers share it behind a single lock so every method is one critical section.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, LruTracker};

// == Cache Store ==
/// Bounded key-value storage with LRU eviction and lazy TTL expiry.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// LRU access tracker
    lru: LruTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries retained after any put
    capacity: usize,
    /// Maximum age of a servable entry
    ttl: Duration,
}

impl<V: Clone> CacheStore<V> {
    // == Constructor ==
    /// Creates a new CacheStore.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries; zero retains nothing
    /// * `ttl` - Maximum entry age; zero makes every read a miss
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            capacity,
            ttl,
        }
    }

    // == Put ==
    /// Inserts or replaces the entry for `key` with a freshly stamped value.
    ///
    /// The key becomes the most recently used. If the store then exceeds its
    /// capacity, the least recently used entry is evicted and its key returned.
    pub fn put(&mut self, key: String, value: V) -> Option<String> {
        self.entries.insert(key.clone(), CacheEntry::new(value));
        self.lru.touch(&key);

        let evicted = if self.entries.len() > self.capacity {
            self.evict_oldest()
        } else {
            None
        };

        self.stats.set_total_entries(self.entries.len());
        evicted
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A hit refreshes the key's recency. An expired entry is removed and
    /// reported as absent.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(self.ttl),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expiration();
            self.stats.set_total_entries(self.entries.len());
            debug!("Cache entry '{}' expired", key);
            return None;
        }

        self.stats.record_hit();
        self.lru.touch(key);
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    // == Snapshot ==
    /// Returns the non-expired entries, most recently used first.
    ///
    /// Neither recency nor statistics are changed.
    pub fn snapshot(&self) -> Vec<(String, V)> {
        let now = Instant::now();
        self.lru
            .iter_recent()
            .filter_map(|key| {
                let entry = self.entries.get(key)?;
                if entry.is_expired_at(self.ttl, now) {
                    None
                } else {
                    Some((key.clone(), entry.value.clone()))
                }
            })
            .collect()
    }

    // == Remove ==
    /// Drops a single entry. Returns true if it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Length ==
    /// Returns the number of stored entries, expired ones included until read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn evict_oldest(&mut self) -> Option<String> {
        let key = self.lru.evict_oldest()?;
        self.entries.remove(&key);
        self.stats.record_eviction();
        debug!("Evicted least recently used entry '{}'", key);
        Some(key)
    }
}
