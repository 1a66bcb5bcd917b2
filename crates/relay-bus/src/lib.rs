//! # Relay Bus - Trace Routing and Batching Engine
//!
//! Routes structured trace records from a producer to subscriptions and
//! delivers them to consumers in periodic batches.
//!
//! ## Data Flow
//!
//! ```text
//! ┌────────────┐  emit()   ┌────────────┐  lookup()  ┌─────────────┐
//! │  TraceHub  │ ────────► │ Dispatcher │ ─────────► │ FilterIndex │
//! └────────────┘           └────────────┘            └─────────────┘
//!                                │ try_enqueue()
//!                                ▼
//!                     ┌──────────────────────┐
//!                     │ SubscriptionBuffer×N │
//!                     └──────────────────────┘
//!                                │ drain_up_to() every interval
//!                                ▼
//!                     ┌──────────────────────┐  handle()  ┌──────────┐
//!                     │ SubscriptionHandler  │ ─────────► │ Consumer │
//!                     └──────────────────────┘            └──────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Routing by name and id only:** filter levels and keywords configure
//!   upstream verbosity through the per-source registration; they do not
//!   narrow delivery.
//! - **Drop-newest:** a full buffer refuses new records and keeps old ones.
//! - **Failure isolation:** a refused insertion or a failing consumer never
//!   affects other subscriptions or the producer.
//! - **One listener per hub:** a second container cannot attach until the
//!   first is disposed.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod buffer;
pub mod builder;
pub mod config;
pub mod container;
pub mod control;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod hub;
pub mod index;
pub mod metrics;
pub mod registration;
pub mod scheduler;

// Re-export main types
pub use buffer::{Drained, SubscriptionBuffer};
pub use builder::{
    CatchAllBuilder, CatchAllSubscription, ContainerBuilder, Subscription, SubscriptionBuilder,
};
pub use config::{
    ExecutionConfig, SubscriptionOptions, DEFAULT_BATCH_INTERVAL, DEFAULT_BUFFER_CAPACITY,
    DEFAULT_MAX_BATCH_SIZE,
};
pub use container::SubscriptionContainer;
pub use control::{ControlToken, PauseState};
pub use dispatcher::{DispatchTarget, Dispatcher};
pub use error::{BufferError, BuildError, ControlError, DispatchError, HubError};
pub use handler::{handler_fn, ConsumerError, HandlerFn, Notification, NotificationHandler};
pub use hub::{EventListener, TraceHub};
pub use index::{FilterIndex, SubscriptionSlot};
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use registration::RegistrationTable;
pub use scheduler::{SchedulerState, SubscriptionHandler};

pub use relay_types;
