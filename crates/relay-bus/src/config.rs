//! Subscription execution and buffering configuration.
//!
//! # Example
//!
//! ```ignore
//! use relay_bus::ExecutionConfig;
//! use std::time::Duration;
//!
//! let execution = ExecutionConfig::new(Duration::from_secs(5), 200)
//!     .expect("Valid config");
//! ```

use relay_types::{ConfigError, MIN_BATCH_INTERVAL};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default time between two scheduler ticks.
pub const DEFAULT_BATCH_INTERVAL: Duration = Duration::from_secs(30);
/// Default maximum number of records per notification.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;
/// Default buffer capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 1000;

/// Scheduler timing and batch cap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Wait between ticks (at least one second).
    pub interval: Duration,
    /// Records drained per tick (at least one).
    pub max_batch_size: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_BATCH_INTERVAL,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl ExecutionConfig {
    /// Create a validated configuration.
    pub fn new(interval: Duration, max_batch_size: usize) -> Result<Self, ConfigError> {
        let config = Self {
            interval,
            max_batch_size,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval < MIN_BATCH_INTERVAL {
            return Err(ConfigError::IntervalTooShort {
                interval: self.interval,
                minimum: MIN_BATCH_INTERVAL,
            });
        }

        if self.max_batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(self.max_batch_size));
        }

        Ok(())
    }
}

/// Per-subscription buffering options.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionOptions {
    /// Maximum records held between ticks (at least one).
    pub buffer_capacity: usize,
}

impl Default for SubscriptionOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl SubscriptionOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity == 0 {
            return Err(ConfigError::InvalidBufferCapacity(self.buffer_capacity));
        }
        Ok(())
    }
}
