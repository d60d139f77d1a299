// src/requester.rs

//! The admission seam shared by local and shared buckets.

// dependencies
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::errors::TokenError;
use crate::token_bucket::TokenBucket;

/// Source of admission tokens for an [`ActionLimiter`](crate::ActionLimiter).
///
/// An implementation backed by a store shared across processes (for example a
/// database procedure that decrements a counter row) must report "nothing to
/// decrement" as [`TokenError::Exhausted`] and connection or query failures as
/// [`TokenError::BackingStore`]. Refilling is the store's own business.
#[async_trait]
pub trait TokenRequester: Send + Sync {
    /// Requests one token. `cancel` is the caller's token and may be used to
    /// abandon a remote round trip; it never touches the bucket's state.
    async fn request_token(&self, cancel: &CancellationToken) -> Result<(), TokenError>;
}

/// The in-process bucket answers immediately and never blocks.
#[async_trait]
impl TokenRequester for TokenBucket {
    async fn request_token(&self, _cancel: &CancellationToken) -> Result<(), TokenError> {
        if self.try_consume() {
            Ok(())
        } else {
            Err(TokenError::Exhausted)
        }
    }
}

#[async_trait]
impl<R> TokenRequester for Arc<R>
where
    R: TokenRequester + ?Sized,
{
    async fn request_token(&self, cancel: &CancellationToken) -> Result<(), TokenError> {
        (**self).request_token(cancel).await
    }
}
