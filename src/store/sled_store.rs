//! sled-backed [`BucketStore`] implementation.
//!
//! Each bucket is a sled tree. Lookups check `tree_names()` first so a read
//! never creates a missing bucket, then walk the tree from its first key in
//! order until the request path turns up. sled is a blocking API, so the
//! walk runs on Tokio's blocking pool.

use std::path::Path;

use async_trait::async_trait;

use super::BucketStore;
use crate::error::RedirectorError;

const BACKEND: &str = "sled";

#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Wrap a database the caller already opened.
    #[must_use]
    pub const fn new(db: sled::Db) -> Self {
        Self { db }
    }

    pub fn open(path: &Path) -> Result<Self, RedirectorError> {
        sled::open(path)
            .map(Self::new)
            .map_err(|e| RedirectorError::store(BACKEND, e))
    }

    #[must_use]
    pub const fn db(&self) -> &sled::Db {
        &self.db
    }

    /// Put `key → value` into `bucket`, creating the bucket if needed.
    pub fn insert(&self, bucket: &str, key: &str, value: &str) -> Result<(), RedirectorError> {
        let tree = self
            .db
            .open_tree(bucket)
            .map_err(|e| RedirectorError::store(BACKEND, e))?;
        tree.insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| RedirectorError::store(BACKEND, e))?;
        Ok(())
    }

    pub async fn flush(&self) -> Result<(), RedirectorError> {
        self.db
            .flush_async()
            .await
            .map(|_| ())
            .map_err(|e| RedirectorError::store(BACKEND, e))
    }
}

fn scan_bucket(db: &sled::Db, bucket: &str, key: &str) -> Result<Option<String>, RedirectorError> {
    let exists = db
        .tree_names()
        .iter()
        .any(|name| &**name == bucket.as_bytes());
    if !exists {
        return Ok(None);
    }

    let tree = db
        .open_tree(bucket)
        .map_err(|e| RedirectorError::store(BACKEND, e))?;

    for entry in tree.iter() {
        let (path, url) = entry.map_err(|e| RedirectorError::store(BACKEND, e))?;
        if &*path == key.as_bytes() {
            let url = String::from_utf8(url.to_vec()).map_err(|e| {
                RedirectorError::store(BACKEND, format!("value for '{key}' is not UTF-8: {e}"))
            })?;
            return Ok(Some(url));
        }
    }

    Ok(None)
}

#[async_trait]
impl BucketStore for SledStore {
    fn name(&self) -> &'static str {
        BACKEND
    }

    async fn lookup(&self, bucket: &str, key: &str) -> Result<Option<String>, RedirectorError> {
        let db = self.db.clone();
        let bucket = bucket.to_owned();
        let key = key.to_owned();
        tokio::task::spawn_blocking(move || scan_bucket(&db, &bucket, &key))
            .await
            .map_err(|e| RedirectorError::store(BACKEND, e))?
    }
}
