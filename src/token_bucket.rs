// src/token_bucket.rs

// bucket-limiter: a token bucket that refills to full capacity on a fixed period.

// dependencies
use crate::config::BucketConfig;
use crate::errors::LimiterError;
use crate::ticker::{IntervalTicker, Ticker};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

/// The token bucket.
///
/// Cloning is cheap and every clone shares the same token count, so one clone
/// can drive the refill loop while others admit calls. The count lives behind
/// a single mutex; both `try_consume` and `refill` hold it only for the
/// check-and-decrement or the reset, never across an await.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    inner: Arc<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    capacity: u64,
    refill_period: Duration,
    tokens: Mutex<u64>,
}

// methods for the TokenBucket type
impl TokenBucket {
    /// Create a full bucket holding `capacity` tokens, reset every `refill_period`.
    pub fn new(capacity: u64, refill_period: Duration) -> Result<Self, LimiterError> {
        Self::with_config(BucketConfig::new(capacity, refill_period))
    }

    // method to create a new bucket from a config object
    pub fn with_config(config: BucketConfig) -> Result<Self, LimiterError> {
        config.validate()?;
        Ok(Self {
            inner: Arc::new(BucketState {
                capacity: config.capacity,
                refill_period: config.refill_period,
                tokens: Mutex::new(config.capacity),
            }),
        })
    }

    pub fn capacity(&self) -> u64 {
        self.inner.capacity
    }

    pub fn refill_period(&self) -> Duration {
        self.inner.refill_period
    }

    /// Tokens left in the current period. Only a snapshot: concurrent
    /// callers may change it before the value is used.
    pub fn available(&self) -> u64 {
        *self.tokens()
    }

    /// Takes one token if any is left. Returns `true` if the call is admitted.
    pub fn try_consume(&self) -> bool {
        let mut tokens = self.tokens();
        if *tokens == 0 {
            return false;
        }
        *tokens -= 1;
        true
    }

    // resets the bucket to full; only the refill loop calls this
    pub(crate) fn refill(&self) {
        *self.tokens() = self.inner.capacity;
        tracing::trace!(capacity = self.inner.capacity, "token bucket refilled");
    }

    // the guarded value is a plain counter, always valid, so poisoning is ignored
    fn tokens(&self) -> MutexGuard<'_, u64> {
        self.inner
            .tokens
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs the refill loop on the current task until `cancel` fires.
    ///
    /// The bucket is reset to capacity once per refill period. Cancellation is
    /// checked before every refill, so no refill happens after it fires.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), LimiterError> {
        self.run_with(IntervalTicker::new(self.refill_period()), cancel)
            .await
    }

    /// Same as [`run`](Self::run) but driven by a caller-supplied tick source.
    /// The ticker is dropped when the loop returns.
    pub async fn run_with<T: Ticker>(
        &self,
        mut ticker: T,
        cancel: CancellationToken,
    ) -> Result<(), LimiterError> {
        tracing::debug!(
            capacity = self.capacity(),
            refill_period_ms = self.refill_period().as_millis() as u64,
            "refill loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(capacity = self.capacity(), "refill loop cancelled");
                    return Ok(());
                }
                tick = ticker.tick() => {
                    tick?;
                    self.refill();
                }
            }
        }
    }

    /// Spawns the refill loop on the current Tokio runtime.
    ///
    /// The loop stops when `cancel` (or any of its parents) fires, or when the
    /// returned [`RefillTask`] is stopped or dropped.
    #[must_use = "dropping the returned RefillTask stops the refill loop"]
    pub fn spawn_refill(&self, cancel: &CancellationToken) -> Result<RefillTask, LimiterError> {
        self.spawn_refill_with(IntervalTicker::new(self.refill_period()), cancel)
    }

    #[must_use = "dropping the returned RefillTask stops the refill loop"]
    pub fn spawn_refill_with<T>(
        &self,
        ticker: T,
        cancel: &CancellationToken,
    ) -> Result<RefillTask, LimiterError>
    where
        T: Ticker + 'static,
    {
        let runtime = Handle::try_current().map_err(|_| LimiterError::NoRuntime)?;
        let token = cancel.child_token();
        let loop_token = token.clone();
        let bucket = self.clone();
        let handle = runtime.spawn(async move { bucket.run_with(ticker, loop_token).await });

        Ok(RefillTask {
            cancel: token.clone(),
            handle,
            _guard: token.drop_guard(),
        })
    }
}

/// Handle to a spawned refill loop.
///
/// Dropping it cancels the loop; [`stop`](Self::stop) cancels and waits for
/// the loop to return. Hold it for as long as the bucket should refill.
#[must_use = "dropping a RefillTask stops the refill loop"]
#[derive(Debug)]
pub struct RefillTask {
    cancel: CancellationToken,
    handle: JoinHandle<Result<(), LimiterError>>,
    _guard: DropGuard,
}

impl RefillTask {
    /// Cancels the loop and waits until it has returned and released its timer.
    pub async fn stop(self) -> Result<(), LimiterError> {
        let RefillTask {
            cancel,
            handle,
            _guard,
        } = self;
        cancel.cancel();
        match handle.await {
            Ok(result) => result,
            Err(err) => Err(LimiterError::RefillTask(err.to_string())),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
