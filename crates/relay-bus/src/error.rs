//! Error types for the relay engine.

use relay_types::ConfigError;
use thiserror::Error;

/// Refused buffer insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Buffer is at capacity; the record was dropped.
    #[error("Buffer full (capacity {capacity}), record dropped")]
    Full { capacity: usize },

    /// Buffer was released by disposal.
    #[error("Buffer closed")]
    Closed,
}

/// Per-subscription dispatch failure. Never surfaced to producers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No registration exists for the record's source.
    #[error("No registration for source '{0}'")]
    UnregisteredSource(String),

    /// The target buffer refused the record.
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Scheduler control failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    /// `start` was called outside a tokio runtime.
    #[error("No tokio runtime available to run the scheduler")]
    NoRuntime,

    /// Pause or resume without an active run.
    #[error("Scheduler has not been started")]
    NotStarted,

    /// The subscription has been disposed.
    #[error("Subscription disposed")]
    Disposed,
}

/// Upstream hub failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HubError {
    /// Another dispatcher is already attached to this hub.
    #[error("A listener is already attached; only one subscription container may be active per hub")]
    ListenerActive,
}

/// Container build failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Nothing to build.
    #[error("At least one subscription needs to be registered")]
    NoSubscriptions,

    /// Two subscriptions share an id.
    #[error("Duplicate subscription id '{0}'")]
    DuplicateSubscriptionId(String),

    /// Filtered and catch-all subscriptions were mixed.
    #[error("Filtered subscriptions and a catch-all subscription cannot be combined")]
    ConflictingModes,

    /// More than one catch-all subscription.
    #[error("Only one catch-all subscription is supported")]
    MultipleCatchAll,

    /// A subscription failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The hub refused the dispatcher.
    #[error(transparent)]
    Hub(#[from] HubError),
}
