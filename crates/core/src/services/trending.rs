//! Trending topic service.
//!
//! Ranks hashtags by how many distinct meeps used them inside a time
//! window. Results are cached for a short TTL and every failure degrades
//! to an empty list, so a broken cache or database never breaks the page
//! embedding the trending list.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use squeaker_common::AppResult;
use squeaker_db::repositories::{MeepHashtagRepository, TagUsage};
use tracing::warn;

use crate::cache::TrendingCache;

/// Lower bound for the cache TTL.
const MIN_TTL_SECS: u64 = 30;

/// Upper bound for the cache TTL.
const MAX_TTL_SECS: u64 = 300;

/// Time window a trending query counts over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendingWindow {
    /// From the most recent UTC midnight to now. Resets daily.
    SinceMidnight,
    /// A rolling window of the past N days.
    PastDays(u32),
}

impl TrendingWindow {
    /// Inclusive start of the window relative to `now`.
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::SinceMidnight => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
            Self::PastDays(days) => now - chrono::Duration::days(i64::from(days)),
        }
    }

    /// Stable fragment for cache keys.
    #[must_use]
    pub fn cache_fragment(self) -> String {
        match self {
            Self::SinceMidnight => "midnight".to_string(),
            Self::PastDays(days) => format!("days_{days}"),
        }
    }
}

/// One entry in a trending list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingTopic {
    /// Hashtag name (lowercase, without #).
    pub name: String,
    /// Distinct meeps that used the tag within the window.
    pub meep_count: i64,
}

impl From<TagUsage> for TrendingTopic {
    fn from(usage: TagUsage) -> Self {
        Self {
            name: usage.name,
            meep_count: usage.meep_count,
        }
    }
}

/// Trending service for business logic.
#[derive(Clone)]
pub struct TrendingService {
    meep_hashtag_repo: MeepHashtagRepository,
    cache: Arc<dyn TrendingCache>,
    ttl: Duration,
}

impl TrendingService {
    /// Create a new trending service. The TTL is clamped to 30..=300 seconds.
    #[must_use]
    pub fn new(
        meep_hashtag_repo: MeepHashtagRepository,
        cache: Arc<dyn TrendingCache>,
        ttl: Duration,
    ) -> Self {
        let secs = ttl.as_secs().clamp(MIN_TTL_SECS, MAX_TTL_SECS);
        Self {
            meep_hashtag_repo,
            cache,
            ttl: Duration::from_secs(secs),
        }
    }

    fn cache_key(window: TrendingWindow, limit: u64, min_count: u64) -> String {
        format!(
            "trending:{}:{limit}:{min_count}",
            window.cache_fragment()
        )
    }

    /// Get the trending topics for a window.
    ///
    /// Tags are ordered by distinct meep count descending, name ascending
    /// on ties, with tags below `min_count` dropped. Any cache or database
    /// failure is logged and an empty list returned.
    pub async fn get_trending(
        &self,
        window: TrendingWindow,
        limit: u64,
        min_count: u64,
    ) -> Vec<TrendingTopic> {
        match self.get_trending_inner(window, limit, min_count).await {
            Ok(topics) => topics,
            Err(e) => {
                warn!(error = %e, "Failed to compute trending topics");
                Vec::new()
            }
        }
    }

    async fn get_trending_inner(
        &self,
        window: TrendingWindow,
        limit: u64,
        min_count: u64,
    ) -> AppResult<Vec<TrendingTopic>> {
        let key = Self::cache_key(window, limit, min_count);

        match self.cache.get(&key).await {
            Ok(Some(topics)) => return Ok(topics),
            Ok(None) => {}
            Err(e) => warn!(error = %e, key = %key, "Trending cache read failed"),
        }

        let window_start = window.start(Utc::now());
        let usage = self
            .meep_hashtag_repo
            .count_by_hashtag_since(window_start, limit, min_count)
            .await?;

        let topics: Vec<TrendingTopic> = usage.into_iter().map(TrendingTopic::from).collect();

        if let Err(e) = self.cache.set(&key, &topics, self.ttl).await {
            warn!(error = %e, key = %key, "Trending cache write failed");
        }

        Ok(topics)
    }

    /// Drop the cached list for one parameter combination.
    pub async fn invalidate(
        &self,
        window: TrendingWindow,
        limit: u64,
        min_count: u64,
    ) -> AppResult<()> {
        self.cache
            .invalidate(&Self::cache_key(window, limit, min_count))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryTrendingCache, NoOpTrendingCache};
    use chrono::TimeZone;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn usage_rows() -> Vec<std::collections::BTreeMap<&'static str, Value>> {
        vec![
            btreemap! {
                "name" => Value::from("rust"),
                "meep_count" => Value::from(5i64),
            },
            btreemap! {
                "name" => Value::from("cats"),
                "meep_count" => Value::from(3i64),
            },
        ]
    }

    #[test]
    fn test_window_since_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let start = TrendingWindow::SinceMidnight.start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_window_past_days() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();
        let start = TrendingWindow::PastDays(7).start(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 3, 7, 15, 9, 26).unwrap());
    }

    #[test]
    fn test_cache_key_includes_all_parameters() {
        assert_eq!(
            TrendingService::cache_key(TrendingWindow::PastDays(7), 5, 3),
            "trending:days_7:5:3"
        );
        assert_eq!(
            TrendingService::cache_key(TrendingWindow::SinceMidnight, 10, 1),
            "trending:midnight:10:1"
        );
    }

    #[test]
    fn test_ttl_is_clamped() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        let repo = MeepHashtagRepository::new(db);

        let service = TrendingService::new(
            repo.clone(),
            Arc::new(NoOpTrendingCache),
            Duration::from_secs(1),
        );
        assert_eq!(service.ttl, Duration::from_secs(30));

        let service = TrendingService::new(
            repo,
            Arc::new(NoOpTrendingCache),
            Duration::from_secs(3600),
        );
        assert_eq!(service.ttl, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_trending_queries_and_caches() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([usage_rows()])
                .into_connection(),
        );

        let cache = Arc::new(MemoryTrendingCache::new());
        let service = TrendingService::new(
            MeepHashtagRepository::new(db),
            cache.clone(),
            Duration::from_secs(60),
        );

        let topics = service
            .get_trending(TrendingWindow::PastDays(7), 5, 3)
            .await;
        assert_eq!(topics.len(), 2);
        assert_eq!(topics[0].name, "rust");
        assert_eq!(topics[0].meep_count, 5);

        // The mock has no second result set, so a hit must come from cache
        let cached = service
            .get_trending(TrendingWindow::PastDays(7), 5, 3)
            .await;
        assert_eq!(cached, topics);
    }

    #[tokio::test]
    async fn test_trending_degrades_to_empty_on_db_error() {
        // No appended results, so the query errors
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );

        let service = TrendingService::new(
            MeepHashtagRepository::new(db),
            Arc::new(NoOpTrendingCache),
            Duration::from_secs(60),
        );

        let topics = service
            .get_trending(TrendingWindow::SinceMidnight, 5, 3)
            .await;
        assert!(topics.is_empty());
    }

    #[tokio::test]
    async fn test_trending_empty_result_is_cached() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<std::collections::BTreeMap<&str, Value>>::new()])
                .into_connection(),
        );

        let cache = Arc::new(MemoryTrendingCache::new());
        let service = TrendingService::new(
            MeepHashtagRepository::new(db),
            cache.clone(),
            Duration::from_secs(60),
        );

        let topics = service
            .get_trending(TrendingWindow::PastDays(1), 5, 3)
            .await;
        assert!(topics.is_empty());

        let cached = cache.get("trending:days_1:5:3").await.unwrap();
        assert_eq!(cached, Some(Vec::new()));
    }
}
