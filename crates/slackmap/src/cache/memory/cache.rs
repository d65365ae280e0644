//! In-memory cache implementation with LRU eviction.
//!
//! Every entry lives for the TTL given at construction. Expired entries are dropped
//! lazily when read.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use slackmap_core::cache::{Cache, Result};

use crate::config::Config;

/// A single cache entry and its deadline.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory cache with a fixed TTL.
///
/// Thread-safe cache using `Arc<RwLock<LruCache>>`; clones share the same store.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
    ttl: Duration,
}

impl MemoryCache {
    /// Creates a cache holding at most `max_entries` values for `ttl` each.
    ///
    /// A `max_entries` of 0 is treated as 1.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cache_max_entries, config.cache_ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, expired ones included until they are read.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        // Write lock: LRU reads update recency.
        let mut store = self.store.write().await;

        match store.get(key) {
            Some(entry) if entry.is_expired(Instant::now()) => {
                store.pop(key);
                tracing::trace!(key, "Cache entry expired");
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let entry = CacheEntry {
            value: value.to_vec(),
            expires_at: Instant::now() + self.ttl,
        };
        self.store.write().await.put(key.to_string(), entry);
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        self.store.write().await.pop(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use slackmap_core::cache::{country_lookup_key, get_json, set_json};

    use super::*;

    const TEST_MAX_ENTRIES: usize = 1000;
    const TEST_TTL: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES, TEST_TTL);
        let key = "test:key";
        let value = b"test value";

        cache.set(key, value).await.unwrap();
        let result = cache.get(key).await.unwrap();

        assert_eq!(result, Some(value.to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES, TEST_TTL);
        let result = cache.get("nonexistent:key").await.unwrap();

        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES, TEST_TTL);
        let key = "test:invalidate";

        cache.set(key, b"to be dropped").await.unwrap();
        assert!(cache.get(key).await.unwrap().is_some());

        cache.invalidate(key).await.unwrap();
        assert!(cache.get(key).await.unwrap().is_none());

        // Dropping a missing key is fine.
        cache.invalidate(key).await.unwrap();
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES, Duration::from_millis(50));
        let key = "test:ttl";

        cache.set(key, b"short-lived").await.unwrap();
        assert!(cache.get(key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(cache.get(key).await.unwrap().is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_refreshes_ttl() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES, Duration::from_millis(80));
        let key = "test:refresh";

        cache.set(key, b"v1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        cache.set(key, b"v2").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get(key).await.unwrap(), Some(b"v2".to_vec()));
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(2, TEST_TTL);

        cache.set("a", b"1").await.unwrap();
        cache.set("b", b"2").await.unwrap();
        // Touch "a" so "b" is the least recently used.
        cache.get("a").await.unwrap();
        cache.set("c", b"3").await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert!(cache.get("a").await.unwrap().is_some());
        assert!(cache.get("b").await.unwrap().is_none());
        assert!(cache.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_zero_capacity_holds_one() {
        let cache = MemoryCache::new(0, TEST_TTL);
        cache.set("a", b"1").await.unwrap();
        assert_eq!(cache.len().await, 1);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct CountryLookup {
        country_code: String,
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES, TEST_TTL);
        let key = country_lookup_key(19.94, 50.06);
        let lookup = CountryLookup {
            country_code: "pl".to_string(),
        };

        set_json(&cache, &key, &lookup).await.unwrap();
        let cached: Option<CountryLookup> = get_json(&cache, &key).await.unwrap();

        assert_eq!(cached, Some(lookup));
    }
}
