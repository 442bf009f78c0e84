//! Persistent key-value store backends and the [`StoreResolver`].
//!
//! A [`BucketStore`] is an opened, externally owned store holding named
//! buckets of path → URL entries. The resolver never opens, closes, or
//! writes to it; every lookup is a read against whatever the store holds
//! at request time.
//!
//! Backends are gated by feature flags: `sled` (default) and `sqlite`.

#[cfg(feature = "sled")]
pub mod sled_store;

#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RedirectorError;
use crate::redirect::Resolver;

/// Bucket the store resolver reads from.
pub const BUCKET: &str = "pathstourls";

#[async_trait]
pub trait BucketStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// Scan `bucket` in key order for `key`. A missing bucket is `Ok(None)`.
    async fn lookup(&self, bucket: &str, key: &str) -> Result<Option<String>, RedirectorError>;
}

pub struct StoreResolver {
    store: Arc<dyn BucketStore>,
    bucket: String,
}

impl StoreResolver {
    #[must_use]
    pub fn new(store: Arc<dyn BucketStore>) -> Self {
        Self::with_bucket(store, BUCKET)
    }

    #[must_use]
    pub fn with_bucket(store: Arc<dyn BucketStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl Resolver for StoreResolver {
    fn name(&self) -> &'static str {
        self.store.name()
    }

    async fn resolve(&self, path: &str) -> Result<Option<String>, RedirectorError> {
        self.store.lookup(&self.bucket, path).await
    }
}
