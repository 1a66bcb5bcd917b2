//! # Registration Table
//!
//! Per-source aggregate of the broadest verbosity any subscriber asked for.
//!
//! The table is handed to the upstream source when it is discovered, so one
//! enablement covers every subscriber. Delivery is not narrowed again per
//! subscriber: a subscription asking for `Error` on a source that another
//! subscription enabled at `Verbose` also receives the verbose records
//! routed to it by the filter index. This fan-in is intentional.

use relay_types::{Registration, SourceFilter};
use std::collections::HashMap;

/// Source name to aggregated [`Registration`].
#[derive(Debug, Clone, Default)]
pub struct RegistrationTable {
    entries: HashMap<String, Registration>,
}

impl RegistrationTable {
    /// Aggregate every filter: max level and OR of keyword masks per source.
    pub fn from_filters<'a, I>(filters: I) -> Self
    where
        I: IntoIterator<Item = &'a SourceFilter>,
    {
        let mut entries: HashMap<String, Registration> = HashMap::new();

        for filter in filters {
            entries
                .entry(filter.source_name.clone())
                .and_modify(|existing| existing.absorb(filter))
                .or_insert_with(|| Registration::from(filter));
        }

        Self { entries }
    }

    /// Registration for `source`, if any filter names it.
    #[must_use]
    pub fn get(&self, source: &str) -> Option<&Registration> {
        self.entries.get(source)
    }

    /// Number of registered sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no source is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registrations, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.entries.values()
    }
}
