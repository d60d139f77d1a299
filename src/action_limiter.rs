// src/action_limiter.rs

// admission control in front of an arbitrary action

// dependencies
use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::config::BucketConfig;
use crate::errors::{LimitError, LimiterError};
use crate::requester::TokenRequester;
use crate::token_bucket::{RefillTask, TokenBucket};

/// A unit of work guarded by an [`ActionLimiter`].
///
/// Any `Fn(CancellationToken) -> impl Future<Output = Result<T, E>>` is an
/// action, so async closures can be wrapped directly.
pub trait Action: Send + Sync {
    type Output: Send;
    type Error: Send;

    fn invoke(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}

impl<F, Fut, T, E> Action for F
where
    F: Fn(CancellationToken) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: Send,
{
    type Output = T;
    type Error = E;

    fn invoke(&self, cancel: CancellationToken) -> impl Future<Output = Result<T, E>> + Send {
        self(cancel)
    }
}

/// Wraps an action so that each call first takes a token.
///
/// `R` defaults to the in-process [`TokenBucket`]; any [`TokenRequester`]
/// works, so the same limiter fronts a shared bucket without changes.
#[derive(Debug)]
pub struct ActionLimiter<A, R = TokenBucket> {
    requester: R,
    action: A,
}

impl<A, R> ActionLimiter<A, R>
where
    A: Action,
    R: TokenRequester,
{
    pub fn new(requester: R, action: A) -> Self {
        Self { requester, action }
    }

    pub fn requester(&self) -> &R {
        &self.requester
    }

    /// Calls the action if a token is available.
    ///
    /// A denied call returns [`LimitError::RateLimited`] without invoking the
    /// action. An admitted call passes `cancel` to the action unchanged and
    /// returns its value, or its error wrapped in [`LimitError::ActionFailed`].
    pub async fn call(&self, cancel: CancellationToken) -> Result<A::Output, LimitError<A::Error>> {
        self.requester.request_token(&cancel).await?;
        self.action
            .invoke(cancel)
            .await
            .map_err(LimitError::ActionFailed)
    }
}

impl<A> ActionLimiter<A>
where
    A: Action,
{
    /// Builds a bucket from `config`, starts its refill loop under `cancel`
    /// and wraps `action` with it.
    ///
    /// Keep the returned [`RefillTask`] alive for as long as the limiter should
    /// keep refilling; dropping it freezes the bucket at its current count.
    #[must_use = "dropping the returned RefillTask stops the refill loop"]
    pub fn spawn(
        config: BucketConfig,
        action: A,
        cancel: &CancellationToken,
    ) -> Result<(Self, RefillTask), LimiterError> {
        let bucket = TokenBucket::with_config(config)?;
        let refill = bucket.spawn_refill(cancel)?;
        Ok((Self::new(bucket, action), refill))
    }
}
