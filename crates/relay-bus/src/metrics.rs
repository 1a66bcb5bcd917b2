//! Dispatch counters.
//!
//! Every per-record failure the dispatcher swallows is counted here, so that
//! dropped records stay observable without surfacing errors to producers.

use crate::error::{BufferError, DispatchError};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe dispatch counters.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    /// Records handed to the dispatcher.
    pub records_received: AtomicU64,
    /// Records matching no subscription.
    pub records_unrouted: AtomicU64,
    /// Successful buffer insertions (one per matched subscription).
    pub records_enqueued: AtomicU64,
    /// Insertions refused by a full buffer.
    pub dropped_full: AtomicU64,
    /// Insertions refused by a closed buffer.
    pub dropped_closed: AtomicU64,
    /// Records whose source had no registration.
    pub dropped_unregistered: AtomicU64,
    /// Sources announced by the upstream.
    pub sources_discovered: AtomicU64,
    /// Announced sources that were enabled.
    pub sources_enabled: AtomicU64,
}

impl DispatchMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_received(&self) {
        self.records_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unrouted(&self) {
        self.records_unrouted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enqueued(&self) {
        self.records_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a swallowed failure under its cause.
    pub fn record_failure(&self, error: &DispatchError) {
        let counter = match error {
            DispatchError::UnregisteredSource(_) => &self.dropped_unregistered,
            DispatchError::Buffer(BufferError::Full { .. }) => &self.dropped_full,
            DispatchError::Buffer(BufferError::Closed) => &self.dropped_closed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_source(&self, enabled: bool) {
        self.sources_discovered.fetch_add(1, Ordering::Relaxed);
        if enabled {
            self.sources_enabled.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_received: self.records_received.load(Ordering::Relaxed),
            records_unrouted: self.records_unrouted.load(Ordering::Relaxed),
            records_enqueued: self.records_enqueued.load(Ordering::Relaxed),
            dropped_full: self.dropped_full.load(Ordering::Relaxed),
            dropped_closed: self.dropped_closed.load(Ordering::Relaxed),
            dropped_unregistered: self.dropped_unregistered.load(Ordering::Relaxed),
            sources_discovered: self.sources_discovered.load(Ordering::Relaxed),
            sources_enabled: self.sources_enabled.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_received: u64,
    pub records_unrouted: u64,
    pub records_enqueued: u64,
    pub dropped_full: u64,
    pub dropped_closed: u64,
    pub dropped_unregistered: u64,
    pub sources_discovered: u64,
    pub sources_enabled: u64,
}

impl MetricsSnapshot {
    /// All dropped insertions, whatever the cause.
    pub fn dropped_total(&self) -> u64 {
        self.dropped_full + self.dropped_closed + self.dropped_unregistered
    }
}
