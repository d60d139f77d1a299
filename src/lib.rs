// src/lib.rs

//! # Bucket Limiter
//!
//! A token-bucket limiter that admits calls to an action while tokens last and
//! resets the bucket to full capacity once per refill period.
//!
//! ## Quick Example
//!
//! ```rust
//! use bucket_limiter::{ActionLimiter, BucketConfig};
//! use std::convert::Infallible;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let shutdown = CancellationToken::new();
//! let config = BucketConfig::new(2, Duration::from_secs(1));
//! let action = |_: CancellationToken| async { Ok::<_, Infallible>("done") };
//!
//! let (limited, refill) = ActionLimiter::spawn(config, action, &shutdown).unwrap();
//!
//! match limited.call(shutdown.clone()).await {
//!     Ok(result) => println!("result: {result}"),
//!     Err(err) if err.is_rate_limited() => println!("rate limited, try again later"),
//!     Err(err) => println!("action failed: {err}"),
//! }
//!
//! refill.stop().await.unwrap();
//! # }
//! ```

// private modules
mod action_limiter;
mod config;
mod errors;
mod requester;
mod shared_store;
mod ticker;
mod token_bucket;

// public API exports
pub use action_limiter::{Action, ActionLimiter};
pub use config::BucketConfig;
pub use errors::{BoxError, LimitError, LimiterError, TokenError};
pub use requester::TokenRequester;
pub use shared_store::{SharedBucketStore, StoreRequester, UnknownBucket};
pub use ticker::{IntervalTicker, Ticker, TickerError};
pub use token_bucket::{RefillTask, TokenBucket};
