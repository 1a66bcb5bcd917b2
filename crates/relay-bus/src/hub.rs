//! # Trace Hub
//!
//! In-process producer of trace records and the upstream side of the
//! [`EventListener`] contract.
//!
//! Sources are announced once; the attached listener decides, per source,
//! whether and how verbosely it is enabled. Emitted records are forwarded
//! only when their source is enabled and the enablement admits their level
//! and keywords.
//!
//! At most one listener is attached at a time. Attaching replays every
//! source announced so far, so a listener attached late still enables them.
//! The hub is a cheap handle: clones share the same state.

use crate::error::HubError;
use parking_lot::RwLock;
use relay_types::{EmittedEvent, Registration};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Receiver of upstream source announcements and records.
pub trait EventListener: Send + Sync {
    /// A new source was announced. Returns the enablement, or `None` to
    /// leave the source disabled.
    fn on_source_created(&self, source: &str) -> Option<Registration>;

    /// A record was written by an enabled source.
    fn on_event_written(&self, event: EmittedEvent);
}

#[derive(Default)]
struct HubState {
    listener: Option<Arc<dyn EventListener>>,
    /// Announced sources and their current enablement.
    sources: BTreeMap<String, Option<Registration>>,
}

#[derive(Default)]
struct HubShared {
    state: RwLock<HubState>,
    emitted: AtomicU64,
    forwarded: AtomicU64,
}

/// Shared producer handle.
#[derive(Clone, Default)]
pub struct TraceHub {
    shared: Arc<HubShared>,
}

impl TraceHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `listener` and replay every announced source to it.
    pub fn attach(&self, listener: Arc<dyn EventListener>) -> Result<(), HubError> {
        let mut state = self.shared.state.write();
        if state.listener.is_some() {
            return Err(HubError::ListenerActive);
        }

        for (source, enablement) in state.sources.iter_mut() {
            *enablement = listener.on_source_created(source);
        }
        state.listener = Some(listener);

        info!(sources = state.sources.len(), "Listener attached to trace hub");
        Ok(())
    }

    /// Detach the listener, if any. Every source becomes disabled.
    pub fn detach(&self) {
        let mut state = self.shared.state.write();
        if state.listener.take().is_some() {
            for enablement in state.sources.values_mut() {
                *enablement = None;
            }
            info!("Listener detached from trace hub");
        }
    }

    pub fn has_listener(&self) -> bool {
        self.shared.state.read().listener.is_some()
    }

    /// Announce `source` and return its enablement.
    ///
    /// Announcing an already known source asks the listener again.
    pub fn announce_source(&self, source: &str) -> Option<Registration> {
        let mut state = self.shared.state.write();
        let enablement = state
            .listener
            .as_ref()
            .and_then(|listener| listener.on_source_created(source));
        state
            .sources
            .insert(source.to_string(), enablement.clone());

        debug!(source, enabled = enablement.is_some(), "Source announced");
        enablement
    }

    /// Enablement of `source`; `None` when unknown or disabled.
    pub fn registration(&self, source: &str) -> Option<Registration> {
        self.shared.state.read().sources.get(source).cloned().flatten()
    }

    /// Announced source names, sorted.
    pub fn sources(&self) -> Vec<String> {
        self.shared.state.read().sources.keys().cloned().collect()
    }

    /// Write a record. Unknown sources are announced first.
    ///
    /// Returns whether the record reached the listener.
    pub fn emit(&self, event: EmittedEvent) -> bool {
        self.shared.emitted.fetch_add(1, Ordering::Relaxed);

        let known = {
            let state = self.shared.state.read();
            state
                .sources
                .get(&event.source_name)
                .map(|enablement| (state.listener.clone(), enablement.clone()))
        };
        let (listener, enablement) = match known {
            Some(known) => known,
            None => {
                let enablement = self.announce_source(&event.source_name);
                (self.shared.state.read().listener.clone(), enablement)
            }
        };

        let (Some(listener), Some(registration)) = (listener, enablement) else {
            return false;
        };
        if !registration.admits(event.level, event.keywords) {
            return false;
        }

        listener.on_event_written(event);
        self.shared.forwarded.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Records passed to [`emit`](Self::emit).
    pub fn events_emitted(&self) -> u64 {
        self.shared.emitted.load(Ordering::Relaxed)
    }

    /// Records handed to the listener.
    pub fn events_forwarded(&self) -> u64 {
        self.shared.forwarded.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for TraceHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("TraceHub")
            .field("has_listener", &state.listener.is_some())
            .field("sources", &state.sources.len())
            .field("emitted", &self.events_emitted())
            .field("forwarded", &self.events_forwarded())
            .finish()
    }
}
