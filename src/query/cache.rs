//! Caller-owned cache of query results.
//!
//! Entries are keyed by query text and live until they are invalidated,
//! the cache is cleared, or their time-to-live runs out.

use crate::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
}

/// Cache of materialized query results.
#[derive(Debug, Clone)]
pub struct ResultCache<T> {
    entries: HashMap<String, CacheEntry<T>>,
    ttl: Option<Duration>,
}

impl<T> Default for ResultCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResultCache<T> {
    /// Creates a cache whose entries never expire.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            ttl: None,
        }
    }

    /// Creates a cache whose entries expire `ttl` after insertion.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl: Some(ttl),
        }
    }

    /// Returns the cached value for `key` unless it is missing or expired.
    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries
            .get(key)
            .filter(|entry| !self.is_expired(entry))
            .map(|entry| &entry.value)
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(
            key.into(),
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drops the entry for `key`. Returns true if there was one.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| !self.is_expired(entry))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &CacheEntry<T>) -> bool {
        self.ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }
}

impl<T: Clone> ResultCache<T> {
    /// Returns the cached value for `key`, running `load` on a miss.
    ///
    /// A failed load leaves the cache untouched.
    pub async fn get_or_load<F, Fut>(&mut self, key: &str, load: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.get(key) {
            debug!("Result cache hit");
            return Ok(value.clone());
        }

        debug!("Result cache miss, loading");
        let value = load().await?;
        self.insert(key, value.clone());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReviewError;

    #[tokio::test]
    async fn test_get_or_load_memoizes() {
        let mut cache = ResultCache::new();
        let mut loads = 0;

        for _ in 0..3 {
            let value = cache
                .get_or_load("SELECT 1", || {
                    loads += 1;
                    async { Ok(42) }
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }

        assert_eq!(loads, 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let mut cache = ResultCache::new();
        cache.insert("q", 1);

        assert!(cache.invalidate("q"));
        assert!(!cache.invalidate("q"));

        let value = cache.get_or_load("q", || async { Ok(2) }).await.unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let mut cache: ResultCache<i32> = ResultCache::new();

        let result = cache
            .get_or_load("q", || async { Err(ReviewError::query_failed("boom")) })
            .await;
        tokio_test::assert_err!(result);

        assert!(cache.get("q").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_expires_entries() {
        let mut cache = ResultCache::with_ttl(Duration::from_secs(60));
        cache.insert("q", "rows");

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("q"), Some(&"rows"));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("q"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_clear() {
        let mut cache = ResultCache::new();
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.clear();
        assert!(cache.is_empty());
    }
}
