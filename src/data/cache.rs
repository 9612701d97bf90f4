//! Source Cache
//! Time-bounded cache of loaded tables keyed by source location.

use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// Keeps each loaded value for at most `ttl`. A zero TTL caches nothing.
pub struct SourceCache<V> {
    ttl: Duration,
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> SourceCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.ttl
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &str, now: Instant) -> Option<&V> {
        self.entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| &entry.value)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V, now: Instant) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    pub fn invalidate(&mut self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every entry that is no longer fresh.
    pub fn evict_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.stored_at) < ttl);
        debug!(remaining = self.entries.len(), "evicted expired entries");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
