//! # Batch Scheduler
//!
//! One [`SubscriptionHandler`] per subscription. Once started it runs a tokio
//! task that, on every tick:
//!
//! 1. waits the configured interval (cut short by cancellation),
//! 2. stops if the run was cancelled,
//! 3. waits out any pause,
//! 4. drains up to `max_batch_size` records from the subscription buffer,
//! 5. hands them to the consumer, even when nothing was drained,
//! 6. records the completion time as the next `previous_execution`.
//!
//! Consumer errors and panics are logged and counted; the loop keeps going.
//! Cancellation is cooperative: a consumer call already in flight completes.

use crate::buffer::{Drained, SubscriptionBuffer};
use crate::config::ExecutionConfig;
use crate::control::ControlToken;
use crate::error::ControlError;
use crate::handler::{Notification, NotificationHandler};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use parking_lot::Mutex;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, trace, warn};

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Never started.
    Stopped,
    /// Ticking.
    Running,
    /// Started but paused, with or without a delay.
    Paused,
    /// Cancelled or disposed. `start` begins a new run unless disposed.
    Cancelled,
}

/// State shared between the handler and its running task.
struct Shared {
    id: String,
    execution: ExecutionConfig,
    buffer: Arc<SubscriptionBuffer>,
    consumer: Arc<dyn NotificationHandler>,
    last_execution: Mutex<Option<DateTime<Utc>>>,
    ticks: AtomicU64,
    consumer_failures: AtomicU64,
}

#[derive(Default)]
struct Control {
    token: Option<ControlToken>,
    disposed: bool,
}

impl Control {
    fn active(&self) -> Option<&ControlToken> {
        self.token.as_ref().filter(|token| !token.is_cancelled())
    }
}

/// Runtime handle of one subscription: its buffer and batch scheduler.
pub struct SubscriptionHandler {
    shared: Arc<Shared>,
    control: Mutex<Control>,
}

impl SubscriptionHandler {
    /// Create a stopped handler.
    ///
    /// `execution` is not validated here; the subscription builder enforces
    /// the minimum interval.
    pub fn new(
        id: impl Into<String>,
        execution: ExecutionConfig,
        buffer: Arc<SubscriptionBuffer>,
        consumer: Arc<dyn NotificationHandler>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: id.into(),
                execution,
                buffer,
                consumer,
                last_execution: Mutex::new(None),
                ticks: AtomicU64::new(0),
                consumer_failures: AtomicU64::new(0),
            }),
            control: Mutex::new(Control::default()),
        }
    }

    /// Subscription id.
    pub fn id(&self) -> &str {
        &self.shared.id
    }

    pub fn execution(&self) -> &ExecutionConfig {
        &self.shared.execution
    }

    pub fn buffer(&self) -> &Arc<SubscriptionBuffer> {
        &self.shared.buffer
    }

    /// Start ticking on the current tokio runtime.
    ///
    /// No-op while a run is active. After a cancellation a fresh run with a
    /// new control token is spawned.
    pub fn start(&self) -> Result<(), ControlError> {
        let mut control = self.control.lock();
        if control.disposed {
            return Err(ControlError::Disposed);
        }
        if control.active().is_some() {
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| ControlError::NoRuntime)?;

        let token = ControlToken::new();
        if let Some(previous) = control.token.replace(token.clone()) {
            previous.cancel();
        }
        drop(control);

        info!(
            subscription = %self.shared.id,
            interval_ms = self.shared.execution.interval.as_millis() as u64,
            max_batch_size = self.shared.execution.max_batch_size,
            "Subscription scheduler started"
        );
        runtime.spawn(run(self.shared.clone(), token));
        Ok(())
    }

    /// Pause the active run for `delay`, or until [`resume`](Self::resume).
    pub fn pause(&self, delay: Option<Duration>) -> Result<(), ControlError> {
        let control = self.control.lock();
        let token = Self::require_active(&control)?;
        token.pause(delay);
        debug!(subscription = %self.shared.id, ?delay, "Subscription paused");
        Ok(())
    }

    /// Resume the active run.
    pub fn resume(&self) -> Result<(), ControlError> {
        let control = self.control.lock();
        let token = Self::require_active(&control)?;
        token.resume();
        debug!(subscription = %self.shared.id, "Subscription resumed");
        Ok(())
    }

    /// Cancel the active run, if any.
    pub fn cancel(&self) {
        let control = self.control.lock();
        if let Some(token) = control.active() {
            token.cancel();
            info!(subscription = %self.shared.id, "Subscription scheduler cancelled");
        }
    }

    /// Cancel, release the buffer and refuse any further start.
    pub fn dispose(&self) {
        let mut control = self.control.lock();
        if control.disposed {
            return;
        }
        control.disposed = true;
        if let Some(token) = control.token.as_ref() {
            token.cancel();
        }
        drop(control);

        self.shared.buffer.close();
        debug!(subscription = %self.shared.id, "Subscription disposed");
    }

    pub fn state(&self) -> SchedulerState {
        let control = self.control.lock();
        match control.token.as_ref() {
            None if control.disposed => SchedulerState::Cancelled,
            None => SchedulerState::Stopped,
            Some(token) if token.is_cancelled() => SchedulerState::Cancelled,
            Some(token) if token.is_paused() => SchedulerState::Paused,
            Some(_) => SchedulerState::Running,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SchedulerState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.state() == SchedulerState::Paused
    }

    pub fn is_disposed(&self) -> bool {
        self.control.lock().disposed
    }

    /// Consumer invocations so far, across runs.
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Relaxed)
    }

    /// Consumer invocations that returned an error or panicked.
    pub fn consumer_failures(&self) -> u64 {
        self.shared.consumer_failures.load(Ordering::Relaxed)
    }

    /// Completion time of the last tick.
    pub fn last_execution(&self) -> Option<DateTime<Utc>> {
        *self.shared.last_execution.lock()
    }

    fn require_active(control: &Control) -> Result<&ControlToken, ControlError> {
        if control.disposed {
            return Err(ControlError::Disposed);
        }
        control.active().ok_or(ControlError::NotStarted)
    }
}

impl std::fmt::Debug for SubscriptionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandler")
            .field("id", &self.shared.id)
            .field("execution", &self.shared.execution)
            .field("state", &self.state())
            .field("buffered", &self.shared.buffer.len())
            .finish()
    }
}

async fn run(shared: Arc<Shared>, token: ControlToken) {
    loop {
        tokio::select! {
            () = tokio::time::sleep(shared.execution.interval) => {}
            () = token.cancelled() => {}
        }

        if token.is_cancelled() {
            break;
        }
        if !token.wait_while_paused().await {
            break;
        }

        tick(&shared).await;
    }

    trace!(subscription = %shared.id, "Scheduler loop exited");
}

async fn tick(shared: &Shared) {
    let Drained { entries, remaining } = shared.buffer.drain_up_to(shared.execution.max_batch_size);
    let notification = Notification {
        events: entries,
        previous_execution: *shared.last_execution.lock(),
        remaining,
    };
    let delivered = notification.len();

    let outcome = AssertUnwindSafe(shared.consumer.handle(notification))
        .catch_unwind()
        .await;
    shared.ticks.fetch_add(1, Ordering::Relaxed);

    match outcome {
        Ok(Ok(())) => {
            trace!(subscription = %shared.id, delivered, remaining, "Batch delivered");
        }
        Ok(Err(e)) => {
            shared.consumer_failures.fetch_add(1, Ordering::Relaxed);
            warn!(subscription = %shared.id, delivered, error = %e, "Consumer failed");
        }
        Err(panic) => {
            shared.consumer_failures.fetch_add(1, Ordering::Relaxed);
            warn!(
                subscription = %shared.id,
                delivered,
                panic = panic_message(&*panic),
                "Consumer panicked"
            );
        }
    }

    *shared.last_execution.lock() = Some(Utc::now());
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
