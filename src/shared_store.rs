// src/shared_store.rs

//! Keyed store of buckets shared by independent callers.
//!
//! Callers address a bucket only by its id, the way a deployment would address
//! a counter row in a shared database. Each registered bucket owns its refill
//! loop; removing or replacing the bucket stops that loop.

// dependencies
use async_trait::async_trait;
use dashmap::DashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::BucketConfig;
use crate::errors::{LimiterError, TokenError};
use crate::requester::TokenRequester;
use crate::token_bucket::{RefillTask, TokenBucket};

/// Reported (inside [`TokenError::BackingStore`]) when a token is requested
/// from an id that was never registered or has been removed.
#[derive(Debug, Error)]
#[error("unknown bucket: {0}")]
pub struct UnknownBucket(pub String);

#[derive(Debug)]
struct StoreEntry {
    bucket: TokenBucket,
    _refill: RefillTask,
}

/// The shared bucket store.
/// K is the type used to identify buckets (e.g., String, u64, etc.).
/// Clones share the same buckets.
#[derive(Debug, Clone)]
pub struct SharedBucketStore<K>
where
    K: Hash + Eq,
{
    buckets: Arc<DashMap<K, StoreEntry>>,
}

impl<K> Default for SharedBucketStore<K>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self {
            buckets: Arc::new(DashMap::new()),
        }
    }
}

impl<K> SharedBucketStore<K>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a full bucket under `id` and starts its refill loop as a child
    /// of `cancel`. A bucket already registered under `id` is replaced and its
    /// refill loop stopped.
    pub fn register(
        &self,
        id: K,
        config: BucketConfig,
        cancel: &CancellationToken,
    ) -> Result<TokenBucket, LimiterError> {
        let bucket = TokenBucket::with_config(config)?;
        let refill = bucket.spawn_refill(cancel)?;
        self.buckets.insert(
            id,
            StoreEntry {
                bucket: bucket.clone(),
                _refill: refill,
            },
        );
        Ok(bucket)
    }

    /// Drops the bucket under `id`. Returns `false` if there was none.
    pub fn remove(&self, id: &K) -> bool {
        self.buckets.remove(id).is_some()
    }

    /// Takes one token from the bucket under `id`.
    pub fn take_token(&self, id: &K) -> Result<(), TokenError> {
        let bucket = self
            .bucket(id)
            .ok_or_else(|| TokenError::BackingStore(Box::new(UnknownBucket(format!("{id:?}")))))?;
        if bucket.try_consume() {
            Ok(())
        } else {
            Err(TokenError::Exhausted)
        }
    }

    pub fn available(&self, id: &K) -> Option<u64> {
        self.bucket(id).map(|bucket| bucket.available())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// A requester bound to one bucket id.
    pub fn requester(&self, id: K) -> StoreRequester<K> {
        StoreRequester {
            store: self.clone(),
            bucket_id: id,
        }
    }

    // clone the handle out so the shard lock is released before consuming
    fn bucket(&self, id: &K) -> Option<TokenBucket> {
        self.buckets.get(id).map(|entry| entry.bucket.clone())
    }
}

/// [`TokenRequester`] for a single bucket in a [`SharedBucketStore`].
#[derive(Debug, Clone)]
pub struct StoreRequester<K>
where
    K: Hash + Eq,
{
    store: SharedBucketStore<K>,
    bucket_id: K,
}

impl<K> StoreRequester<K>
where
    K: Hash + Eq,
{
    pub fn bucket_id(&self) -> &K {
        &self.bucket_id
    }
}

#[async_trait]
impl<K> TokenRequester for StoreRequester<K>
where
    K: Hash + Eq + Clone + Debug + Send + Sync + 'static,
{
    async fn request_token(&self, _cancel: &CancellationToken) -> Result<(), TokenError> {
        self.store.take_token(&self.bucket_id)
    }
}
