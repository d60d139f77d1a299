// src/ticker.rs

// tick source used by the refill loop

// dependencies
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Ticker trait to abstract the periodic timer behind the refill loop.
/// Implementors must be `Send` so the loop can run on a spawned task.
/// `tick` resolves once per period; the loop refills the bucket each time it does.
/// Dropping the ticker must release any timer resource it holds.
#[async_trait]
pub trait Ticker: Send {
    async fn tick(&mut self) -> Result<(), TickerError>;
}

/// Ticker error type
#[derive(Debug, Error)]
pub enum TickerError {
    #[error("tick source closed")]
    Closed,
    #[error("tick period must be positive")]
    ZeroPeriod,
}

/// IntervalTicker implementation using `tokio::time::Interval`.
/// The first tick fires one full period after the first call to `tick`,
/// so a freshly started bucket is not refilled immediately.
/// The interval is created lazily, inside the task that polls it, and
/// missed ticks are skipped rather than replayed.
#[derive(Debug)]
pub struct IntervalTicker {
    period: Duration,
    interval: Option<Interval>,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> Result<(), TickerError> {
        let period = self.period;
        if period.is_zero() {
            return Err(TickerError::ZeroPeriod);
        }
        let interval = self.interval.get_or_insert_with(|| {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });
        interval.tick().await;
        Ok(())
    }
}
