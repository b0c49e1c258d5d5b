//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Redis configuration.
    pub redis: RedisConfig,
    /// Trending aggregation configuration.
    #[serde(default)]
    pub trending: TrendingConfig,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL.
    pub url: String,
    /// Key prefix for all Redis keys.
    #[serde(default = "default_redis_prefix")]
    pub prefix: String,
}

/// Trending aggregation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TrendingConfig {
    /// Cached trending result TTL in seconds.
    #[serde(default = "default_trending_ttl_secs")]
    pub ttl_secs: u64,
    /// Default number of trending tags to return.
    #[serde(default = "default_trending_limit")]
    pub limit: u64,
    /// Minimum meep count for a tag to appear in trending results.
    #[serde(default = "default_trending_min_count")]
    pub min_count: u64,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_trending_ttl_secs(),
            limit: default_trending_limit(),
            min_count: default_trending_min_count(),
        }
    }
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_redis_prefix() -> String {
    "squeaker".to_string()
}

const fn default_trending_ttl_secs() -> u64 {
    300
}

const fn default_trending_limit() -> u64 {
    5
}

const fn default_trending_min_count() -> u64 {
    3
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `SQUEAKER_ENV`)
    /// 3. Environment variables with `SQUEAKER_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("SQUEAKER_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("SQUEAKER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("SQUEAKER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
