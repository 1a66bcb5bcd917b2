//! Downstream consumer contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use relay_types::EventRecord;
use std::future::Future;
use std::sync::Arc;

/// Failure returned by a consumer. Logged and counted, never propagated.
pub type ConsumerError = Box<dyn std::error::Error + Send + Sync>;

/// One batch delivered to a consumer.
#[derive(Debug, Clone, Default)]
pub struct Notification {
    /// Drained records, oldest first. May be empty.
    pub events: Vec<Arc<EventRecord>>,
    /// When the previous tick completed; `None` until a first tick has run.
    pub previous_execution: Option<DateTime<Utc>>,
    /// Records left in the buffer after this drain.
    pub remaining: usize,
}

impl Notification {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.events.iter().map(Arc::as_ref)
    }

    pub fn into_events(self) -> Vec<Arc<EventRecord>> {
        self.events
    }
}

/// Consumer of batched notifications.
///
/// Called once per scheduler tick, including ticks with nothing drained.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    async fn handle(&self, notification: Notification) -> Result<(), ConsumerError>;
}

/// Adapter turning an async closure into a [`NotificationHandler`].
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap `f` as a [`NotificationHandler`].
///
/// ```ignore
/// let consumer = handler_fn(|batch: Notification| async move {
///     println!("{} events", batch.len());
///     Ok(())
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> Arc<HandlerFn<F>>
where
    F: Fn(Notification) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ConsumerError>> + Send + 'static,
{
    Arc::new(HandlerFn { f })
}

#[async_trait]
impl<F, Fut> NotificationHandler for HandlerFn<F>
where
    F: Fn(Notification) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ConsumerError>> + Send + 'static,
{
    async fn handle(&self, notification: Notification) -> Result<(), ConsumerError> {
        (self.f)(notification).await
    }
}
