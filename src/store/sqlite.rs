//! SQLite-backed [`BucketStore`] implementation.
//!
//! A bucket is a table named after it with the schema
//! `(path TEXT PRIMARY KEY, url TEXT NOT NULL)`. Lookups check
//! `sqlite_master` first so a missing bucket reads as "no match" rather
//! than an error. Bucket names are restricted to `[A-Za-z0-9_]` since they
//! end up in SQL text.

use std::path::Path;

use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::SqlitePool;

use super::BucketStore;
use crate::error::RedirectorError;

const BACKEND: &str = "sqlite";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn open(path: &Path) -> Result<Self, RedirectorError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| RedirectorError::store(BACKEND, e))?;

        Ok(Self::new(pool))
    }

    /// Put `key → value` into `bucket`, creating the table if needed.
    pub async fn insert(&self, bucket: &str, key: &str, value: &str) -> Result<(), RedirectorError> {
        let table = table_name(bucket)?;

        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (\
                path TEXT PRIMARY KEY, \
                url TEXT NOT NULL\
            )"
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| RedirectorError::store(BACKEND, e))?;

        sqlx::query(&format!(
            "INSERT OR REPLACE INTO {table} (path, url) VALUES (?, ?)"
        ))
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| RedirectorError::store(BACKEND, e))?;

        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn table_name(bucket: &str) -> Result<String, RedirectorError> {
    if bucket.is_empty()
        || !bucket
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(RedirectorError::store(
            BACKEND,
            format!("invalid bucket name '{bucket}'"),
        ));
    }
    Ok(format!("\"{bucket}\""))
}

#[async_trait]
impl BucketStore for SqliteStore {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn lookup(&self, bucket: &str, key: &str) -> Result<Option<String>, RedirectorError> {
        let table = table_name(bucket)?;

        let exists: Option<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?")
                .bind(bucket)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RedirectorError::store(BACKEND, e))?;

        if exists.is_none() {
            return Ok(None);
        }

        let sql = format!("SELECT url FROM {table} WHERE path = ?");
        let row: Option<(String,)> = sqlx::query_as(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RedirectorError::store(BACKEND, e))?;

        Ok(row.map(|(url,)| url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BUCKET;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_store() -> SqliteStore {
        // One connection: every connection to :memory: is a separate database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn finds_inserted_paths() {
        let store = memory_store().await;
        store.insert(BUCKET, "/z", "https://z.example").await.unwrap();
        store.insert(BUCKET, "/a", "https://a.example").await.unwrap();

        assert_eq!(
            store.lookup(BUCKET, "/z").await.unwrap().as_deref(),
            Some("https://z.example")
        );
        assert_eq!(
            store.lookup(BUCKET, "/a").await.unwrap().as_deref(),
            Some("https://a.example")
        );
        assert!(store.lookup(BUCKET, "/m").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_table_is_no_match() {
        let store = memory_store().await;
        assert!(store.lookup(BUCKET, "/a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn hostile_bucket_name_is_rejected() {
        let store = memory_store().await;
        let err = store
            .lookup("x; DROP TABLE y", "/a")
            .await
            .unwrap_err();
        assert!(matches!(err, RedirectorError::Store { backend: "sqlite", .. }));
    }

    #[tokio::test]
    async fn closed_pool_is_store_error() {
        let store = memory_store().await;
        store.close().await;
        assert!(store.lookup(BUCKET, "/a").await.is_err());
    }
}
