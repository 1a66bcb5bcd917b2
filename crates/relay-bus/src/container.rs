//! # Subscription Container
//!
//! Owns every subscription handler of one build together with the
//! dispatcher, and keeps the dispatcher attached to its hub until disposal.
//! Lifecycle calls fan out to every handler.

use crate::dispatcher::Dispatcher;
use crate::error::ControlError;
use crate::hub::TraceHub;
use crate::metrics::MetricsSnapshot;
use crate::scheduler::SubscriptionHandler;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Active set of subscriptions attached to a [`TraceHub`].
///
/// Built by [`ContainerBuilder`](crate::ContainerBuilder). Dropping the
/// container disposes it.
pub struct SubscriptionContainer {
    handlers: BTreeMap<String, SubscriptionHandler>,
    dispatcher: Arc<Dispatcher>,
    hub: TraceHub,
    disposed: AtomicBool,
}

impl SubscriptionContainer {
    /// Wrap handlers whose dispatcher is already attached to `hub`.
    pub(crate) fn new(
        handlers: BTreeMap<String, SubscriptionHandler>,
        dispatcher: Arc<Dispatcher>,
        hub: TraceHub,
    ) -> Self {
        Self {
            handlers,
            dispatcher,
            hub,
            disposed: AtomicBool::new(false),
        }
    }

    /// Start every subscription scheduler.
    pub fn start(&self) -> Result<(), ControlError> {
        self.ensure_live()?;
        for handler in self.handlers.values() {
            handler.start()?;
        }
        info!(subscriptions = self.handlers.len(), "Subscriptions started");
        Ok(())
    }

    /// Pause every subscription for `delay`, or until resumed.
    pub fn pause(&self, delay: Option<Duration>) -> Result<(), ControlError> {
        self.ensure_live()?;
        self.handlers
            .values()
            .try_for_each(|handler| handler.pause(delay))
    }

    /// Resume every subscription.
    pub fn resume(&self) -> Result<(), ControlError> {
        self.ensure_live()?;
        self.handlers.values().try_for_each(SubscriptionHandler::resume)
    }

    /// Cancel every running scheduler; `start` may restart them.
    pub fn cancel(&self) {
        for handler in self.handlers.values() {
            handler.cancel();
        }
    }

    /// Detach from the hub, cancel every scheduler and release every
    /// buffer. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        self.hub.detach();
        for handler in self.handlers.values() {
            handler.dispose();
        }
        info!(subscriptions = self.handlers.len(), "Subscription container disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Handler of subscription `id`.
    pub fn get(&self, id: &str) -> Option<&SubscriptionHandler> {
        self.handlers.get(id)
    }

    /// Subscription ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubscriptionHandler> {
        self.handlers.values()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Whether the container runs a single catch-all subscription.
    pub fn is_catch_all(&self) -> bool {
        self.dispatcher.is_catch_all()
    }

    /// Dispatch counters of this container.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.dispatcher.metrics()
    }

    fn ensure_live(&self) -> Result<(), ControlError> {
        if self.is_disposed() {
            return Err(ControlError::Disposed);
        }
        Ok(())
    }
}

impl Drop for SubscriptionContainer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for SubscriptionContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionContainer")
            .field("subscriptions", &self.handlers.keys().collect::<Vec<_>>())
            .field("dispatcher", &self.dispatcher)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
