//! # Dispatcher
//!
//! Receives every record pushed by the upstream hub and fans it out to the
//! buffers of the matching subscriptions.
//!
//! Two modes, fixed at construction:
//!
//! - **Filtered**: routing through a prebuilt [`FilterIndex`]; upstream
//!   enablement from a prebuilt [`RegistrationTable`]. Both are immutable, so
//!   the hot path takes no lock besides the target buffer's.
//! - **Catch-all**: one target receives everything. Every announced source is
//!   enabled at the same minimum level with all keywords.
//!
//! Per-target failures are counted and logged at `trace`, never returned.

use crate::buffer::SubscriptionBuffer;
use crate::error::DispatchError;
use crate::hub::EventListener;
use crate::index::FilterIndex;
use crate::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::registration::RegistrationTable;
use chrono::Utc;
use parking_lot::RwLock;
use relay_types::{EmittedEvent, EventLevel, EventRecord, Keywords, Registration, SourceFilter};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// One subscription as seen by the dispatcher.
#[derive(Debug, Clone)]
pub struct DispatchTarget {
    pub id: String,
    pub buffer: Arc<SubscriptionBuffer>,
    pub filters: Vec<SourceFilter>,
}

enum Mode {
    Filtered {
        index: FilterIndex,
        registrations: RegistrationTable,
        targets: Vec<DispatchTarget>,
    },
    CatchAll {
        minimum_level: EventLevel,
        registrations: RwLock<HashMap<String, Registration>>,
        target: DispatchTarget,
    },
}

/// Routes upstream records into subscription buffers.
pub struct Dispatcher {
    mode: Mode,
    metrics: DispatchMetrics,
}

impl Dispatcher {
    /// Filtered mode over `targets`, in registration order.
    pub fn filtered(targets: Vec<DispatchTarget>) -> Self {
        let index = FilterIndex::build(
            targets
                .iter()
                .enumerate()
                .map(|(slot, target)| (slot, target.filters.iter())),
        );
        let registrations =
            RegistrationTable::from_filters(targets.iter().flat_map(|t| t.filters.iter()));

        debug!(
            subscriptions = targets.len(),
            sources = registrations.len(),
            "Filtered dispatcher built"
        );

        Self {
            mode: Mode::Filtered {
                index,
                registrations,
                targets,
            },
            metrics: DispatchMetrics::new(),
        }
    }

    /// Catch-all mode: `id` receives every record at up to `minimum_level`.
    pub fn catch_all(
        id: impl Into<String>,
        buffer: Arc<SubscriptionBuffer>,
        minimum_level: EventLevel,
    ) -> Self {
        let target = DispatchTarget {
            id: id.into(),
            buffer,
            filters: Vec::new(),
        };
        debug!(subscription = %target.id, %minimum_level, "Catch-all dispatcher built");

        Self {
            mode: Mode::CatchAll {
                minimum_level,
                registrations: RwLock::new(HashMap::new()),
                target,
            },
            metrics: DispatchMetrics::new(),
        }
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self.mode, Mode::CatchAll { .. })
    }

    /// Registration the source is (or would be) enabled with.
    pub fn registration(&self, source: &str) -> Option<Registration> {
        match &self.mode {
            Mode::Filtered { registrations, .. } => registrations.get(source).cloned(),
            Mode::CatchAll { registrations, .. } => registrations.read().get(source).cloned(),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn enqueue(&self, target: &DispatchTarget, record: &Arc<EventRecord>) {
        match target.buffer.try_enqueue(Arc::clone(record)) {
            Ok(()) => self.metrics.record_enqueued(),
            Err(e) => self.fail(&target.id, record, e.into()),
        }
    }

    fn fail(&self, subscription: &str, record: &EventRecord, error: DispatchError) {
        self.metrics.record_failure(&error);
        trace!(
            subscription,
            source = %record.source_name,
            event_id = record.id,
            error = %error,
            "Record dropped"
        );
    }

    fn unregistered(&self, event: &EmittedEvent) {
        let error = DispatchError::UnregisteredSource(event.source_name.clone());
        self.metrics.record_failure(&error);
        trace!(
            source = %event.source_name,
            event_id = event.id,
            error = %error,
            "Record dropped"
        );
    }
}

impl EventListener for Dispatcher {
    fn on_source_created(&self, source: &str) -> Option<Registration> {
        let registration = match &self.mode {
            Mode::Filtered { registrations, .. } => registrations.get(source).cloned(),
            Mode::CatchAll {
                minimum_level,
                registrations,
                ..
            } => {
                let registration = Registration::new(source, *minimum_level, Keywords::ALL);
                registrations
                    .write()
                    .insert(source.to_string(), registration.clone());
                Some(registration)
            }
        };

        self.metrics.record_source(registration.is_some());
        match &registration {
            Some(r) => debug!(source, level = %r.level, keywords = %r.keywords, "Source enabled"),
            None => trace!(source, "Source ignored"),
        }
        registration
    }

    fn on_event_written(&self, event: EmittedEvent) {
        self.metrics.record_received();

        match &self.mode {
            Mode::Filtered {
                index,
                registrations,
                targets,
            } => {
                let slots = index.lookup(&event.source_name, event.id);
                if slots.is_empty() {
                    self.metrics.record_unrouted();
                    return;
                }

                let Some(registration) = registrations.get(&event.source_name) else {
                    self.unregistered(&event);
                    return;
                };

                let record = Arc::new(EventRecord::from_emitted(
                    event,
                    registration.clone(),
                    Utc::now(),
                ));
                for &slot in slots {
                    self.enqueue(&targets[slot], &record);
                }
            }
            Mode::CatchAll {
                registrations,
                target,
                ..
            } => {
                let registration = registrations.read().get(&event.source_name).cloned();
                let Some(registration) = registration else {
                    self.unregistered(&event);
                    return;
                };

                let record = Arc::new(EventRecord::from_emitted(event, registration, Utc::now()));
                self.enqueue(target, &record);
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (mode, subscriptions) = match &self.mode {
            Mode::Filtered { targets, .. } => ("filtered", targets.len()),
            Mode::CatchAll { .. } => ("catch_all", 1),
        };
        f.debug_struct("Dispatcher")
            .field("mode", &mode)
            .field("subscriptions", &subscriptions)
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}
