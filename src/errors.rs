// src/errors.rs

// error handling for the token bucket and the limited action

// dependencies
use thiserror::Error;

use crate::ticker::TickerError;

/// Boxed error used for failures of an external token store.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for bucket construction and refill lifecycle issues.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LimiterError {
    /// capacity == 0
    #[error("Capacity must be positive")]
    InvalidCapacity,
    /// refill period == 0
    #[error("Refill period must be positive")]
    InvalidRefillPeriod,
    /// the tick source stopped before the refill loop was cancelled
    #[error("Ticker error occurred: {0}")]
    Ticker(#[from] TickerError),
    #[error("No Tokio runtime available to drive the refill loop")]
    NoRuntime,
    #[error("Refill task terminated abnormally: {0}")]
    RefillTask(String),
}

/// Outcome of a failed token request.
///
/// Every [`TokenRequester`](crate::TokenRequester) reports a denial as
/// [`TokenError::Exhausted`], whether the bucket lives in memory or in a
/// shared store. Infrastructure failures are kept apart as
/// [`TokenError::BackingStore`] so callers can handle them differently.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("no tokens available")]
    Exhausted,
    #[error("backing store failure: {0}")]
    BackingStore(#[source] BoxError),
}

/// Error returned by [`ActionLimiter::call`](crate::ActionLimiter::call).
///
/// `E` is the wrapped action's own error type; it is carried in
/// [`LimitError::ActionFailed`] exactly as the action returned it.
#[derive(Debug, Error)]
pub enum LimitError<E> {
    /// No token was available; the action was not invoked.
    #[error("no tokens available")]
    RateLimited,
    /// The token store could not be reached; the action was not invoked.
    #[error("backing store failure: {0}")]
    BackingStore(#[source] BoxError),
    /// The action ran and failed.
    #[error("action failed: {0}")]
    ActionFailed(E),
}

impl<E> LimitError<E> {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LimitError::RateLimited)
    }

    /// Returns the action's error, or `None` if the call was never admitted.
    pub fn into_action_error(self) -> Option<E> {
        match self {
            LimitError::ActionFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl<E> From<TokenError> for LimitError<E> {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Exhausted => LimitError::RateLimited,
            TokenError::BackingStore(source) => LimitError::BackingStore(source),
        }
    }
}
