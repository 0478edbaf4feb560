//! In-memory cache implementation using the moka crate.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use idhub_core::config::cache::MemoryCacheConfig;
use idhub_core::result::AppResult;
use idhub_core::traits::cache::CacheProvider;

/// In-memory cache provider using moka.
///
/// moka applies its TTL at the cache level, not per entry; callers that
/// need a shorter logical lifetime embed an expiry timestamp in the value
/// and check it on read.
#[derive(Debug, Clone)]
pub struct MemoryCacheProvider {
    /// The underlying moka cache.
    cache: Cache<String, String>,
    /// Default TTL for entries.
    default_ttl: Duration,
}

impl MemoryCacheProvider {
    /// Create a new in-memory cache from configuration.
    pub fn new(config: &MemoryCacheConfig, default_ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.time_to_live_seconds))
            .build();

        Self {
            cache,
            default_ttl: Duration::from_secs(default_ttl_seconds),
        }
    }
}

#[async_trait]
impl CacheProvider for MemoryCacheProvider {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.cache.get(key).await)
    }

    async fn set(&self, key: &str, value: &str, _ttl: Duration) -> AppResult<()> {
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(())
    }

    async fn set_default(&self, key: &str, value: &str) -> AppResult<()> {
        self.set(key, value, self.default_ttl).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.cache.remove(key).await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn set_nx(&self, key: &str, value: &str, _ttl: Duration) -> AppResult<bool> {
        // moka has no native set-if-not-exists; get-then-insert is
        // acceptable for in-memory single-node use.
        if self.cache.contains_key(key) {
            return Ok(false);
        }
        self.cache.insert(key.to_string(), value.to_string()).await;
        Ok(true)
    }

    async fn expire(&self, key: &str, _ttl: Duration) -> AppResult<bool> {
        // moka cannot change the TTL of an existing entry; re-inserting
        // keeps the entry alive under the cache-level TTL.
        if let Some(val) = self.cache.get(key).await {
            self.cache.insert(key.to_string(), val).await;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
