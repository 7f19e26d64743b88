//! In-memory response cache with TTL expiry
//!
//! `CacheStore` is the authoritative store of cached dashboard responses
//! for one process lifetime - nothing is persisted, so a reload always
//! starts cold and stale data cannot leak across sessions. Expiry is
//! enforced lazily: `has`/`get` evict an expired entry on contact, and
//! [`CacheStore::clear_expired`] is an optional sweep for memory hygiene,
//! never required for correctness.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

/// Default time-to-live for cached responses: 5 minutes (300 000 ms).
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// Thread-safe response cache with per-entry TTL expiry
///
/// At most one entry exists per key; `set` replaces the whole entry and
/// re-establishes validity from the call time. An entry is valid strictly
/// before its expiry instant; an expired entry is logically absent even
/// while it still occupies memory.
pub struct CacheStore {
    entries: DashMap<String, CacheEntry>,
    default_ttl: Duration,
    stats: CacheStats,
}

/// A cached response value with its absolute expiry instant
struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_valid(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Cache counters tracked atomically
#[derive(Debug, Default)]
struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStore {
    /// Create an empty store with the standard 5-minute default TTL
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_ttl(DEFAULT_TTL)
    }

    /// Create an empty store with a custom default TTL
    #[must_use]
    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
            stats: CacheStats::default(),
        }
    }

    /// Check whether a valid entry exists for `key`.
    ///
    /// An expired entry found here is deleted as a side effect (lazy
    /// eviction) and reported as absent.
    pub fn has(&self, key: &str) -> bool {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_valid(Instant::now()) {
                return true;
            }
            drop(entry);
            self.evict(key);
        }
        false
    }

    /// Get the cached value for `key` if a valid entry exists.
    ///
    /// Reading never extends or refreshes an entry's TTL. Expired
    /// entries are evicted on contact, exactly as in [`CacheStore::has`].
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(entry) = self.entries.get(key) {
            if entry.is_valid(Instant::now()) {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            drop(entry);
            self.evict(key);
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store or replace the entry for `key`.
    ///
    /// Validity runs from now for `ttl`, or for the store's default TTL
    /// when no per-call override is given. Always succeeds.
    pub fn set(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        debug!(key, ttl_ms = ttl.as_millis() as u64, "cached response");
    }

    /// Remove the entry for `key` if present. No-op otherwise.
    pub fn remove(&self, key: &str) {
        if self.entries.remove(key).is_some() {
            debug!(key, "removed cache entry");
        }
    }

    /// Remove all entries.
    pub fn clear(&self) {
        self.entries.clear();
        debug!("cleared cache");
    }

    /// Sweep out every expired entry and return how many were removed.
    ///
    /// Purely a memory-hygiene aid - `has`/`get` already enforce expiry
    /// lazily, so calling this at any cadence (or never) is safe.
    pub fn clear_expired(&self) -> usize {
        let now = Instant::now();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter_map(|e| (!e.value().is_valid(now)).then(|| e.key().clone()))
            .collect();

        let count = expired.len();
        for key in expired {
            self.evict(&key);
        }
        if count > 0 {
            debug!(count, "swept expired cache entries");
        }
        count
    }

    /// Snapshot of the current cache state for diagnostics.
    ///
    /// `size` and `keys` include expired entries that no lookup or sweep
    /// has evicted yet - the reporting surface is allowed to run ahead
    /// of lazy eviction and callers must not treat it as a validity
    /// check.
    pub fn stats(&self) -> CacheStatsSnapshot {
        CacheStatsSnapshot {
            size: self.entries.len(),
            keys: self.entries.iter().map(|e| e.key().clone()).collect(),
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
            evictions: self.stats.evictions.load(Ordering::Relaxed),
        }
    }

    fn evict(&self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.stats.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(key, "evicted expired cache entry");
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of cache state and counters
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStatsSnapshot {
    /// Current number of entries, expired-but-unswept included
    pub size: usize,
    /// Keys currently present, expired-but-unswept included
    pub keys: Vec<String>,
    /// Lookups served from cache
    pub hits: u64,
    /// Lookups that found no valid entry
    pub misses: u64,
    /// Expired entries removed (lazily or by sweep)
    pub evictions: u64,
}

impl CacheStatsSnapshot {
    /// Hit rate over all counted lookups (0.0–1.0)
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
