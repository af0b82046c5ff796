//! Cache layer
//!
//! Read-through cache for the public listings. Entries are JSON-encoded and
//! grouped by key prefix (`exhibitors:*`, `events:*`, ...) so a write can drop
//! everything derived from the entity it touched.
//!
//! ```rust,ignore
//! use feira::cache::{create_cache, CacheLayer};
//! use feira::config::CacheConfig;
//!
//! let cache = create_cache(&CacheConfig::default());
//! cache.set("exhibitors:all", &list, cache.default_ttl()).await?;
//! cache.delete_pattern("exhibitors:*").await?;
//! ```

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::MemoryCache;

/// Cache operations
///
/// The methods are generic, so this trait is not object safe; runtime
/// selection goes through the [`Cache`] enum.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete every key matching a glob pattern (`*` and `?`)
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

#[derive(Debug)]
pub enum Cache {
    Memory(MemoryCache),
    /// `ttl_seconds: 0`; every read misses
    Disabled,
}

impl Cache {
    /// TTL applied by services when caching a read
    pub fn default_ttl(&self) -> Duration {
        match self {
            Cache::Memory(cache) => cache.default_ttl(),
            Cache::Disabled => Duration::ZERO,
        }
    }

    /// Changes whenever an entry is deleted or a pattern invalidated
    pub fn generation(&self) -> u64 {
        match self {
            Cache::Memory(cache) => cache.generation(),
            Cache::Disabled => 0,
        }
    }
}

#[async_trait]
impl CacheLayer for Cache {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self {
            Cache::Memory(cache) => cache.get(key).await,
            Cache::Disabled => Ok(None),
        }
    }

    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        match self {
            Cache::Memory(cache) => cache.set(key, value, ttl).await,
            Cache::Disabled => Ok(()),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match self {
            Cache::Memory(cache) => cache.delete(key).await,
            Cache::Disabled => Ok(()),
        }
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        match self {
            Cache::Memory(cache) => cache.delete_pattern(pattern).await,
            Cache::Disabled => Ok(()),
        }
    }

    async fn clear(&self) -> Result<()> {
        match self {
            Cache::Memory(cache) => cache.clear().await,
            Cache::Disabled => Ok(()),
        }
    }
}

/// Build the cache described by `config`
pub fn create_cache(config: &CacheConfig) -> Arc<Cache> {
    if config.ttl_seconds == 0 {
        tracing::info!("Cache disabled (ttl_seconds = 0)");
        return Arc::new(Cache::Disabled);
    }

    let ttl = Duration::from_secs(config.ttl_seconds);
    Arc::new(Cache::Memory(MemoryCache::with_capacity_and_ttl(
        config.max_entries,
        ttl,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_cache_from_config() {
        let cache = create_cache(&CacheConfig::default());
        assert!(matches!(cache.as_ref(), Cache::Memory(_)));
        assert_eq!(cache.default_ttl(), Duration::from_secs(300));

        cache.set("events:all", &vec![1, 2], cache.default_ttl()).await.unwrap();
        let hit: Option<Vec<i32>> = cache.get("events:all").await.unwrap();
        assert_eq!(hit, Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn test_disabled_cache_never_hits() {
        let cache = create_cache(&CacheConfig {
            ttl_seconds: 0,
            ..Default::default()
        });
        assert!(matches!(cache.as_ref(), Cache::Disabled));

        cache.set("events:all", &1, Duration::from_secs(60)).await.unwrap();
        let miss: Option<i32> = cache.get("events:all").await.unwrap();
        assert_eq!(miss, None);
        cache.delete_pattern("events:*").await.unwrap();
        cache.clear().await.unwrap();
    }
}
