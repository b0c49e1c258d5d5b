//! Trending topic caching.
//!
//! The trending query is an aggregate over the whole link table, so its
//! results are cached for a short TTL. Three backends are provided: Redis
//! for deployments, an in-process map for single-node setups and tests,
//! and a no-op backend that always misses.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use fred::clients::Client as RedisClient;
use fred::interfaces::KeysInterface;
use fred::types::Expiration;
use squeaker_common::{AppError, AppResult};
use tokio::sync::RwLock;
use tracing::debug;

use crate::services::trending::TrendingTopic;

/// Cache backend for trending topic lists.
#[async_trait]
pub trait TrendingCache: Send + Sync {
    /// Look up a cached topic list. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> AppResult<Option<Vec<TrendingTopic>>>;

    /// Store a topic list under `key` for `ttl`.
    async fn set(&self, key: &str, topics: &[TrendingTopic], ttl: Duration) -> AppResult<()>;

    /// Drop a cached entry.
    async fn invalidate(&self, key: &str) -> AppResult<()>;
}

/// Redis-backed trending cache.
#[derive(Clone)]
pub struct RedisTrendingCache {
    redis: Arc<RedisClient>,
    prefix: String,
}

impl RedisTrendingCache {
    /// Create a new Redis trending cache. `prefix` namespaces the keys.
    #[must_use]
    pub fn new(redis: Arc<RedisClient>, prefix: &str) -> Self {
        Self {
            redis,
            prefix: prefix.to_string(),
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{key}", self.prefix)
    }
}

#[async_trait]
impl TrendingCache for RedisTrendingCache {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<TrendingTopic>>> {
        let full_key = self.full_key(key);

        let result: Option<String> = self
            .redis
            .get(full_key)
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        if let Some(json_str) = result {
            let topics: Vec<TrendingTopic> =
                serde_json::from_str(&json_str).map_err(|e| AppError::Cache(e.to_string()))?;
            debug!(key = %key, "Trending cache hit");
            Ok(Some(topics))
        } else {
            debug!(key = %key, "Trending cache miss");
            Ok(None)
        }
    }

    async fn set(&self, key: &str, topics: &[TrendingTopic], ttl: Duration) -> AppResult<()> {
        let full_key = self.full_key(key);
        let json_str =
            serde_json::to_string(topics).map_err(|e| AppError::Cache(e.to_string()))?;

        self.redis
            .set::<(), _, _>(
                full_key,
                json_str,
                Some(Expiration::EX(ttl.as_secs() as i64)),
                None,
                false,
            )
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        Ok(())
    }

    async fn invalidate(&self, key: &str) -> AppResult<()> {
        let full_key = self.full_key(key);

        self.redis
            .del::<(), _>(full_key)
            .await
            .map_err(|e| AppError::Cache(e.to_string()))?;

        Ok(())
    }
}

/// In-process trending cache with per-entry expiry.
#[derive(Clone, Default)]
pub struct MemoryTrendingCache {
    entries: Arc<RwLock<HashMap<String, (Instant, Vec<TrendingTopic>)>>>,
}

impl MemoryTrendingCache {
    /// Create an empty in-process cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrendingCache for MemoryTrendingCache {
    async fn get(&self, key: &str) -> AppResult<Option<Vec<TrendingTopic>>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some((expires_at, topics)) if *expires_at > Instant::now() => {
                debug!(key = %key, "Trending cache hit");
                Ok(Some(topics.clone()))
            }
            _ => {
                debug!(key = %key, "Trending cache miss");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, topics: &[TrendingTopic], ttl: Duration) -> AppResult<()> {
        let mut entries = self.entries.write().await;
        // Expired entries are dropped lazily when overwritten or missed
        entries.retain(|_, (expires_at, _)| *expires_at > Instant::now());
        entries.insert(key.to_string(), (Instant::now() + ttl, topics.to_vec()));
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

/// No-op cache that always misses. Used when no cache backend is configured.
#[derive(Clone, Copy, Default)]
pub struct NoOpTrendingCache;

#[async_trait]
impl TrendingCache for NoOpTrendingCache {
    async fn get(&self, _key: &str) -> AppResult<Option<Vec<TrendingTopic>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _topics: &[TrendingTopic], _ttl: Duration) -> AppResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _key: &str) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(name: &str, meep_count: i64) -> TrendingTopic {
        TrendingTopic {
            name: name.to_string(),
            meep_count,
        }
    }

    #[tokio::test]
    async fn test_memory_cache_round_trip() {
        let cache = MemoryTrendingCache::new();
        let topics = vec![topic("rust", 12), topic("go", 5)];

        cache
            .set("trending:7:5:3", &topics, Duration::from_secs(60))
            .await
            .unwrap();

        let cached = cache.get("trending:7:5:3").await.unwrap().unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].name, "rust");
        assert_eq!(cached[0].meep_count, 12);
    }

    #[tokio::test]
    async fn test_memory_cache_expiry() {
        let cache = MemoryTrendingCache::new();
        let topics = vec![topic("rust", 1)];

        cache
            .set("k", &topics, Duration::from_secs(0))
            .await
            .unwrap();

        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_invalidate() {
        let cache = MemoryTrendingCache::new();
        cache
            .set("k", &[topic("rust", 1)], Duration::from_secs(60))
            .await
            .unwrap();

        cache.invalidate("k").await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_noop_cache_always_misses() {
        let cache = NoOpTrendingCache;
        cache
            .set("k", &[topic("rust", 1)], Duration::from_secs(60))
            .await
            .unwrap();

        assert!(cache.get("k").await.unwrap().is_none());
    }
}
