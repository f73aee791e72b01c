//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cached value and the instant it was stored.
///
/// Entries are never mutated; a refresh replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Monotonic creation instant
    pub created_at: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry stamped with the current instant.
    pub fn new(value: V) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry is older than `ttl`.
    ///
    /// A zero TTL marks every entry as expired, so a store configured that
    /// way never serves a hit.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.is_expired_at(ttl, Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) evaluated at `now`.
    pub fn is_expired_at(&self, ttl: Duration, now: Instant) -> bool {
        if ttl.is_zero() {
            return true;
        }
        now.saturating_duration_since(self.created_at) > ttl
    }
}
