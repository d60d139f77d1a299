// src/config.rs

//! Configuration types for the token bucket

// dependencies
use crate::errors::LimiterError;
use std::time::Duration;

/// Configuration for a token bucket: how many calls are admitted per period,
/// and how often the bucket resets to full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketConfig {
    pub(crate) capacity: u64,
    pub(crate) refill_period: Duration,
}

impl BucketConfig {
    /// Create a new configuration with capacity and refill period settings
    pub fn new(capacity: u64, refill_period: Duration) -> Self {
        Self {
            capacity,
            refill_period,
        }
    }

    /// Builder-style: set capacity
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builder-style: set refill period
    pub fn refill_period(mut self, refill_period: Duration) -> Self {
        self.refill_period = refill_period;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), LimiterError> {
        if self.capacity == 0 {
            return Err(LimiterError::InvalidCapacity);
        }
        if self.refill_period.is_zero() {
            return Err(LimiterError::InvalidRefillPeriod);
        }
        Ok(())
    }
}
