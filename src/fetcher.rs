//! Cache-checked fetch wrapper
//!
//! `CachingFetcher` adapts any asynchronous fetch operation into a
//! cache-checked one: callers describe the request (resource + params),
//! hand over a closure that performs the real fetch, and never need to
//! know whether the answer came from the cache or the network.
//!
//! Each call is independent - on a hit the closure is never invoked, on
//! a miss it is invoked exactly once, and a failed fetch stores nothing
//! so the next identical request retries naturally. Concurrent misses on
//! the same key are not deduplicated; both fetch and the last write wins.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::Result;
use crate::cache::{CacheStatsSnapshot, CacheStore};
use crate::key;

/// Cache-checked wrapper around arbitrary async fetch operations
pub struct CachingFetcher {
    store: Arc<CacheStore>,
    enabled: bool,
}

impl CachingFetcher {
    /// Create a fetcher backed by `store` with caching enabled
    #[must_use]
    pub fn new(store: Arc<CacheStore>) -> Self {
        Self::with_enabled(store, true)
    }

    /// Create a fetcher with caching switched on or off globally.
    ///
    /// A disabled fetcher passes every request straight through to its
    /// fetch closure without touching the store.
    #[must_use]
    pub fn with_enabled(store: Arc<CacheStore>, enabled: bool) -> Self {
        Self { store, enabled }
    }

    /// Perform a cache-checked request.
    ///
    /// With `use_cache` false the store is neither read nor written -
    /// the escape hatch for call sites that need guaranteed freshness.
    /// Otherwise a valid cached value is returned without invoking
    /// `fetch`; on a miss `fetch` runs once and its result is stored
    /// under the derived key with `ttl` (or the store default) before
    /// being returned.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidParams`] if `params` cannot be serialized
    /// into a key - raised before `fetch` is ever invoked. A failing
    /// `fetch` propagates its error unchanged and leaves the cache
    /// untouched.
    pub async fn request<T, P, F, Fut>(
        &self,
        resource: &str,
        params: Option<&P>,
        ttl: Option<Duration>,
        use_cache: bool,
        fetch: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        P: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !use_cache || !self.enabled {
            return fetch().await;
        }

        let key = key::derive_key(resource, params)?;

        if let Some(cached) = self.store.get(&key) {
            debug!(resource, "cache hit");
            return Ok(serde_json::from_value(cached)?);
        }

        debug!(resource, "cache miss, fetching");
        let fetched = fetch().await?;
        self.store.set(&key, serde_json::to_value(&fetched)?, ttl);
        Ok(fetched)
    }

    /// Invalidate the single entry for (`resource`, `params`).
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidParams`] if `params` cannot be serialized.
    pub fn invalidate<P: Serialize>(&self, resource: &str, params: Option<&P>) -> Result<()> {
        self.store.remove(&key::derive_key(resource, params)?);
        Ok(())
    }

    /// Drop every cached entry. The next request for any key is a miss
    /// until the cache repopulates.
    pub fn clear_all(&self) {
        self.store.clear();
    }

    /// Diagnostic snapshot of the underlying store. Not a validity
    /// oracle - see [`CacheStore::stats`].
    #[must_use]
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.store.stats()
    }
}
