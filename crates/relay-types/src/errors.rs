//! # Error Types
//!
//! Configuration errors raised while validating subscriptions.

use std::time::Duration;
use thiserror::Error;

/// Shortest accepted batch interval.
pub const MIN_BATCH_INTERVAL: Duration = Duration::from_secs(1);

/// Invalid subscription configuration, detected at build time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Subscription id is empty.
    #[error("Subscription id must not be empty")]
    EmptySubscriptionId,

    /// Subscription has no filters.
    #[error("Subscription '{subscription}' must listen to at least one source filter")]
    NoFilters { subscription: String },

    /// A filter has an empty source name.
    #[error("Source filter must name a source")]
    EmptySourceName,

    /// Batch interval below [`MIN_BATCH_INTERVAL`].
    #[error("Batch interval {interval:?} is shorter than the minimum of {minimum:?}")]
    IntervalTooShort { interval: Duration, minimum: Duration },

    /// Batch size of zero.
    #[error("Maximum batch size must be at least 1 (got {0})")]
    InvalidBatchSize(usize),

    /// Buffer capacity of zero.
    #[error("Buffer capacity must be at least 1 (got {0})")]
    InvalidBufferCapacity(usize),

    /// No consumer bound to the subscription.
    #[error("Subscription '{subscription}' has no consumer; bind one with `consumer()`")]
    MissingConsumer { subscription: String },
}
