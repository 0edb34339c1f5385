//! Persistence for the last successful current-conditions payload per location.
//!
//! Entries carry their own fetch and expiry timestamps. Stores never hide
//! expired rows on read: the repository decides what is fresh and may still
//! serve a stale entry when the network is down.

mod memory;
mod sqlite;

pub use memory::MemoryCacheStore;
pub use sqlite::SqliteCacheStore;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Lifetime of a cached snapshot: 30 minutes.
pub const CACHE_TTL_MS: i64 = 30 * 60 * 1000;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Database operation failed: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CacheEntry {
    pub location_key: String,
    #[sqlx(rename = "weather_data")]
    pub payload: String,
    #[sqlx(rename = "fetched_at")]
    pub fetched_at_millis: i64,
    #[sqlx(rename = "expires_at")]
    pub expires_at_millis: i64,
}

impl CacheEntry {
    /// Builds an entry whose expiry is `fetched_at_millis + CACHE_TTL_MS`.
    pub fn new(location_key: String, payload: String, fetched_at_millis: i64) -> Self {
        Self {
            location_key,
            payload,
            fetched_at_millis,
            expires_at_millis: fetched_at_millis + CACHE_TTL_MS,
        }
    }

    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis - self.fetched_at_millis
    }

    /// Fresh up to and including the TTL boundary.
    pub fn is_fresh(&self, now_millis: i64) -> bool {
        self.age_millis(now_millis) <= CACHE_TTL_MS
    }

    /// Eligible for the expiry sweep.
    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expires_at_millis < now_millis
    }
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Backend name for logs and health output.
    fn name(&self) -> &'static str;

    async fn get(&self, location_key: &str) -> Result<Option<CacheEntry>, CacheError>;

    /// Inserts or fully replaces the entry for `entry.location_key`.
    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError>;

    /// Deletes every entry with `expires_at_millis < now_millis`, returning the count.
    async fn delete_expired(&self, now_millis: i64) -> Result<u64, CacheError>;

    async fn clear(&self) -> Result<u64, CacheError>;

    /// All entries ordered by location key.
    async fn list_all(&self) -> Result<Vec<CacheEntry>, CacheError>;

    async fn health_check(&self) -> Result<(), CacheError> {
        Ok(())
    }
}
