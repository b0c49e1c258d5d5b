//! Core business logic for squeaker.

pub mod cache;
pub mod services;

pub use cache::{MemoryTrendingCache, NoOpTrendingCache, RedisTrendingCache, TrendingCache};
pub use services::*;
