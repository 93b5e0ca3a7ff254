// In-memory TTL cache shared by every caller that needs the same resource.
// Handles expiry checks, capacity eviction, and hit/miss statistics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// Default TTL for profile and repository data: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Default cap on stored entries.
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// A cached value with the time it was fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The cached value.
    pub value: T,
    /// When the value was fetched.
    pub fetched_at: Instant,
}

impl<T> CacheEntry<T> {
    /// Create a new entry stamped with the current time.
    pub fn new(value: T) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
        }
    }

    /// Check whether the entry has outlived `ttl` as of `now`.
    pub fn is_expired_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) >= ttl
    }
}

/// Counts of stored entries, split by freshness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total: usize,
    pub valid: usize,
    pub expired: usize,
}

impl CacheStats {
    pub fn merge(self, other: CacheStats) -> CacheStats {
        CacheStats {
            total: self.total + other.total,
            valid: self.valid + other.valid,
            expired: self.expired + other.expired,
        }
    }
}

/// Key to value store with time-based expiry.
///
/// Clones share the same storage. Expired entries are treated as misses but
/// are only removed by `clear`, by being overwritten, or by capacity eviction.
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: Arc<Mutex<HashMap<String, CacheEntry<T>>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<T> Clone for TtlCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            ttl: self.ttl,
            max_entries: self.max_entries,
        }
    }
}

impl<T: Clone> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }
}

impl<T: Clone> TtlCache<T> {
    /// Create a cache. A `max_entries` of zero is treated as one.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
        // Entries are plain overwrites, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the value for `key` if it was set less than one TTL ago.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        let entries = self.lock();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now, self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: T) {
        let key = key.into();
        let mut entries = self.lock();

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(key = %oldest, "Evicting oldest cache entry");
                entries.remove(&oldest);
            }
        }

        entries.insert(key, CacheEntry::new(value));
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.lock();
        let valid = entries
            .values()
            .filter(|entry| !entry.is_expired_at(now, self.ttl))
            .count();

        CacheStats {
            total: entries.len(),
            valid,
            expired: entries.len() - valid,
        }
    }
}
