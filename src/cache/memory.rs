//! In-memory cache on top of moka
//!
//! Values are stored as JSON strings so any serializable type fits. Each
//! entry carries its own TTL, bounded by the cache-wide default.

use super::CacheLayer;
use anyhow::{Context, Result};
use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Clone)]
struct CacheEntry {
    json: Arc<String>,
    ttl: Duration,
}

impl CacheEntry {
    fn encode<T: Serialize>(value: &T, ttl: Duration) -> Result<Self> {
        let json = serde_json::to_string(value).context("Failed to serialize cache value")?;
        Ok(Self {
            json: Arc::new(json),
            ttl,
        })
    }

    fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.json).context("Failed to deserialize cache value")
    }
}

/// Expire each entry after the TTL it was stored with
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, value: &CacheEntry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

pub struct MemoryCache {
    cache: Cache<String, CacheEntry>,
    default_ttl: Duration,
    /// Bumped before every invalidation
    generation: AtomicU64,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entry_count", &self.cache.entry_count())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

impl MemoryCache {
    pub fn with_capacity_and_ttl(max_capacity: u64, default_ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(default_ttl)
            .expire_after(EntryTtl)
            .build();

        Self {
            cache,
            default_ttl,
            generation: AtomicU64::new(0),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn bump_generation(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Approximate; moka applies writes lazily
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Glob match with `*` (any run) and `?` (one char)
    fn pattern_matches(pattern: &str, key: &str) -> bool {
        let pattern: Vec<char> = pattern.chars().collect();
        let key: Vec<char> = key.chars().collect();

        let (mut p, mut k) = (0, 0);
        // Last `*` seen and the key position it is currently absorbing up to
        let mut backtrack: Option<(usize, usize)> = None;

        while k < key.len() {
            match pattern.get(p) {
                Some('*') => {
                    backtrack = Some((p, k));
                    p += 1;
                }
                Some(&c) if c == '?' || c == key[k] => {
                    p += 1;
                    k += 1;
                }
                _ => match backtrack {
                    Some((star, absorbed)) => {
                        p = star + 1;
                        k = absorbed + 1;
                        backtrack = Some((star, absorbed + 1));
                    }
                    None => return false,
                },
            }
        }

        pattern[p..].iter().all(|&c| c == '*')
    }
}

#[async_trait]
impl CacheLayer for MemoryCache {
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        match self.cache.get(key).await {
            Some(entry) => Ok(Some(entry.decode()?)),
            None => Ok(None),
        }
    }

    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::encode(value, ttl.min(self.default_ttl))?;
        self.cache.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.bump_generation();
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<()> {
        self.bump_generation();
        // Full scan; the cache holds a handful of listing keys per entity
        let matching: Vec<String> = self
            .cache
            .iter()
            .filter(|(key, _)| Self::pattern_matches(pattern, key))
            .map(|(key, _)| key.as_ref().clone())
            .collect();

        for key in matching {
            self.cache.invalidate(&key).await;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.bump_generation();
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn cache() -> MemoryCache {
        MemoryCache::with_capacity_and_ttl(100, Duration::from_secs(60))
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Booth {
        id: i64,
        name: String,
    }

    #[tokio::test]
    async fn test_struct_values_round_trip() {
        let cache = cache();
        let booths = vec![Booth {
            id: 1,
            name: "Pavilhão A".to_string(),
        }];
        cache.set("exhibitors:all", &booths, Duration::from_secs(60)).await.unwrap();

        let hit: Option<Vec<Booth>> = cache.get("exhibitors:all").await.unwrap();
        assert_eq!(hit, Some(booths));
        let miss: Option<Vec<Booth>> = cache.get("exhibitors:id:1").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_wrong_type_is_an_error() {
        let cache = cache();
        cache.set("settings", &"texto", Duration::from_secs(60)).await.unwrap();
        assert!(cache.get::<Vec<i64>>("settings").await.is_err());
    }

    #[tokio::test]
    async fn test_per_entry_ttl() {
        let cache = cache();
        cache.set("short", &1, Duration::from_millis(20)).await.unwrap();
        cache.set("long", &2, Duration::from_secs(60)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(cache.get::<i32>("short").await.unwrap(), None);
        assert_eq!(cache.get::<i32>("long").await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn test_delete_pattern_only_touches_prefix() {
        let cache = cache();
        for key in ["events:all", "events:id:3", "exhibitors:all", "settings"] {
            cache.set(key, &key, Duration::from_secs(60)).await.unwrap();
        }
        cache.cache.run_pending_tasks().await;

        cache.delete_pattern("events:*").await.unwrap();

        assert!(cache.get::<String>("events:all").await.unwrap().is_none());
        assert!(cache.get::<String>("events:id:3").await.unwrap().is_none());
        assert!(cache.get::<String>("exhibitors:all").await.unwrap().is_some());
        assert!(cache.get::<String>("settings").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let cache = cache();
        cache.set("a", &1, Duration::from_secs(60)).await.unwrap();
        cache.set("b", &2, Duration::from_secs(60)).await.unwrap();

        cache.delete("a").await.unwrap();
        assert!(cache.get::<i32>("a").await.unwrap().is_none());

        cache.clear().await.unwrap();
        assert!(cache.get::<i32>("b").await.unwrap().is_none());
        assert_eq!(cache.entry_count(), 0);
    }

    #[test]
    fn test_pattern_matches() {
        assert!(MemoryCache::pattern_matches("exhibitors:*", "exhibitors:all"));
        assert!(MemoryCache::pattern_matches("exhibitors:*", "exhibitors:"));
        assert!(MemoryCache::pattern_matches("*:id:?", "events:id:7"));
        assert!(MemoryCache::pattern_matches("a*b*c", "aXXbYYbc"));
        assert!(MemoryCache::pattern_matches("*", ""));
        assert!(!MemoryCache::pattern_matches("*:id:?", "events:id:17"));
        assert!(!MemoryCache::pattern_matches("events:*", "exhibitors:all"));
        assert!(!MemoryCache::pattern_matches("settings", "settings:x"));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(50))]

            #[test]
            fn prefix_star_matches_exactly_the_prefix(prefix in "[a-z]{1,8}", rest in "[a-z:0-9]{0,8}", other in "[a-z]{1,8}") {
                let pattern = format!("{}:*", prefix);
                let key = format!("{}:{}", prefix, rest);
                prop_assert!(MemoryCache::pattern_matches(&pattern, &key));
                prop_assert_eq!(
                    MemoryCache::pattern_matches(&pattern, &format!("{}:{}", other, rest)),
                    other == prefix
                );
            }

            #[test]
            fn literal_pattern_is_equality(a in "[a-z:]{0,10}", b in "[a-z:]{0,10}") {
                prop_assert_eq!(MemoryCache::pattern_matches(&a, &b), a == b);
            }
        }
    }
}
