//! # Filter Index
//!
//! Maps `(source name, event id)` to the subscriptions that want the record.
//!
//! Built once from every subscription's filters. For each source the index
//! keeps the wildcard subscribers and, for every exact id, the precomputed
//! union of exact and wildcard subscribers. A lookup is therefore at most two
//! hash probes and returns a ready slice: nothing is merged or deduplicated
//! on the hot path.

use relay_types::SourceFilter;
use std::collections::HashMap;

/// Position of a subscription in the dispatcher's target table.
pub type SubscriptionSlot = usize;

#[derive(Debug, Default)]
struct SourceRoutes {
    /// Subscribers with a wildcard filter on the source.
    wildcard: Vec<SubscriptionSlot>,
    /// Exact id to (exact ∪ wildcard) subscribers.
    by_id: HashMap<i32, Vec<SubscriptionSlot>>,
}

/// Immutable routing table from records to subscriptions.
#[derive(Debug, Default)]
pub struct FilterIndex {
    sources: HashMap<String, SourceRoutes>,
}

impl FilterIndex {
    /// Build the index from `(slot, filters)` pairs.
    ///
    /// Slots keep the order in which they are first seen, so lookups return
    /// subscribers in registration order.
    pub fn build<'a, I, F>(subscriptions: I) -> Self
    where
        I: IntoIterator<Item = (SubscriptionSlot, F)>,
        F: IntoIterator<Item = &'a SourceFilter>,
    {
        let mut sources: HashMap<String, SourceRoutes> = HashMap::new();

        for (slot, filters) in subscriptions {
            for filter in filters {
                let routes = sources.entry(filter.source_name.clone()).or_default();
                let targets = match filter.event_id {
                    Some(id) => routes.by_id.entry(id).or_default(),
                    None => &mut routes.wildcard,
                };
                if !targets.contains(&slot) {
                    targets.push(slot);
                }
            }
        }

        // Fold wildcard subscribers into every exact entry of the same source.
        for routes in sources.values_mut() {
            let SourceRoutes { wildcard, by_id } = routes;
            for targets in by_id.values_mut() {
                for slot in wildcard.iter() {
                    if !targets.contains(slot) {
                        targets.push(*slot);
                    }
                }
                targets.sort_unstable();
            }
        }

        Self { sources }
    }

    /// Subscriptions that should receive a record from `source_name` with
    /// `event_id`. Empty when the source is not registered.
    #[must_use]
    pub fn lookup(&self, source_name: &str, event_id: i32) -> &[SubscriptionSlot] {
        let Some(routes) = self.sources.get(source_name) else {
            return &[];
        };

        match routes.by_id.get(&event_id) {
            Some(targets) => targets,
            None => &routes.wildcard,
        }
    }

    /// Whether any filter names `source_name`.
    #[must_use]
    pub fn contains_source(&self, source_name: &str) -> bool {
        self.sources.contains_key(source_name)
    }

    /// Number of distinct sources.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}
