use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use super::{CacheEntry, CacheError, CacheStore};

pub struct SqliteCacheStore {
    pool: SqlitePool,
}

impl SqliteCacheStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database at `database_url` and ensures the schema.
    pub async fn connect(database_url: &str) -> Result<Self, CacheError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.init_tables().await?;
        tracing::info!("Weather cache opened at {}", database_url);
        Ok(store)
    }

    pub async fn init_tables(&self) -> Result<(), CacheError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS weather_cache (
                location_key TEXT PRIMARY KEY NOT NULL,
                weather_data TEXT NOT NULL,
                fetched_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_weather_cache_expires_at ON weather_cache(expires_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl CacheStore for SqliteCacheStore {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn get(&self, location_key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let entry = sqlx::query_as::<_, CacheEntry>(
            r#"
            SELECT location_key, weather_data, fetched_at, expires_at
            FROM weather_cache
            WHERE location_key = ?
            LIMIT 1
            "#,
        )
        .bind(location_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), CacheError> {
        // One statement, so a row is never half written.
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO weather_cache (location_key, weather_data, fetched_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&entry.location_key)
        .bind(&entry.payload)
        .bind(entry.fetched_at_millis)
        .bind(entry.expires_at_millis)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_expired(&self, now_millis: i64) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM weather_cache WHERE expires_at < ?")
            .bind(now_millis)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn clear(&self) -> Result<u64, CacheError> {
        let result = sqlx::query("DELETE FROM weather_cache")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn list_all(&self) -> Result<Vec<CacheEntry>, CacheError> {
        let entries = sqlx::query_as::<_, CacheEntry>(
            r#"
            SELECT location_key, weather_data, fetched_at, expires_at
            FROM weather_cache
            ORDER BY location_key
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    async fn health_check(&self) -> Result<(), CacheError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
