//! # Source Filters and Registrations
//!
//! A [`SourceFilter`] selects records by source name and, optionally, by
//! exact event id. Its level and keyword mask are verbosity hints: they are
//! folded into the per-source [`Registration`] used to enable the upstream
//! source and play no part in delivery-time matching.

use crate::errors::ConfigError;
use crate::level::{EventLevel, Keywords};
use serde::{Deserialize, Serialize};

/// Routing rule plus upstream verbosity hints.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceFilter {
    /// Name of the emitting source. Must not be empty.
    pub source_name: String,
    /// Exact event id to match. `None` matches every event of the source.
    pub event_id: Option<i32>,
    /// Requested verbosity for the source.
    pub minimum_level: EventLevel,
    /// Requested keyword mask for the source.
    pub keywords: Keywords,
}

impl SourceFilter {
    /// Match every event of `source_name`.
    #[must_use]
    pub fn wildcard(source_name: impl Into<String>, minimum_level: EventLevel) -> Self {
        Self {
            source_name: source_name.into(),
            event_id: None,
            minimum_level,
            keywords: Keywords::ALL,
        }
    }

    /// Match only `event_id` of `source_name`.
    #[must_use]
    pub fn exact(source_name: impl Into<String>, event_id: i32, minimum_level: EventLevel) -> Self {
        Self {
            source_name: source_name.into(),
            event_id: Some(event_id),
            minimum_level,
            keywords: Keywords::ALL,
        }
    }

    /// Every critical event of the source.
    #[must_use]
    pub fn all_critical(source_name: impl Into<String>) -> Self {
        Self::wildcard(source_name, EventLevel::Critical)
    }

    /// Every error (and critical) event of the source.
    #[must_use]
    pub fn all_errors(source_name: impl Into<String>) -> Self {
        Self::wildcard(source_name, EventLevel::Error)
    }

    /// Every warning-or-worse event of the source.
    #[must_use]
    pub fn all_warnings(source_name: impl Into<String>) -> Self {
        Self::wildcard(source_name, EventLevel::Warning)
    }

    /// Every informational-or-worse event of the source.
    #[must_use]
    pub fn all_informational(source_name: impl Into<String>) -> Self {
        Self::wildcard(source_name, EventLevel::Informational)
    }

    /// Every event of the source.
    #[must_use]
    pub fn all_verbose(source_name: impl Into<String>) -> Self {
        Self::wildcard(source_name, EventLevel::Verbose)
    }

    /// Replace the keyword mask.
    #[must_use]
    pub fn with_keywords(mut self, keywords: impl Into<Keywords>) -> Self {
        self.keywords = keywords.into();
        self
    }

    /// Whether this filter has no event id.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.event_id.is_none()
    }

    /// Whether a record from `source_name` with `event_id` is routed by
    /// this filter.
    #[must_use]
    pub fn matches(&self, source_name: &str, event_id: i32) -> bool {
        self.source_name == source_name && self.event_id.map_or(true, |id| id == event_id)
    }

    /// Reject filters without a source name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_name.is_empty() {
            return Err(ConfigError::EmptySourceName);
        }
        Ok(())
    }
}

/// Aggregated enablement for one source.
///
/// The broadest level and the union of keyword masks requested by any
/// filter on the source, so that a single upstream enablement satisfies
/// every subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Registration {
    /// Source name.
    pub source: String,
    /// Widest level requested; `LogAlways` once any filter asks for it.
    pub level: EventLevel,
    /// OR of every requested keyword mask.
    pub keywords: Keywords,
}

impl Registration {
    /// Create a registration.
    #[must_use]
    pub fn new(source: impl Into<String>, level: EventLevel, keywords: Keywords) -> Self {
        Self {
            source: source.into(),
            level,
            keywords,
        }
    }

    /// Widen this registration to also cover `filter`.
    pub fn absorb(&mut self, filter: &SourceFilter) {
        self.level = self.level.widest(filter.minimum_level);
        self.keywords |= filter.keywords;
    }

    /// Whether the upstream source, enabled with this registration, emits a
    /// record with the given level and keywords.
    #[must_use]
    pub fn admits(&self, level: EventLevel, keywords: Keywords) -> bool {
        self.level.admits(level) && self.keywords.admits(keywords)
    }
}

impl From<&SourceFilter> for Registration {
    fn from(filter: &SourceFilter) -> Self {
        Self::new(
            filter.source_name.clone(),
            filter.minimum_level,
            filter.keywords,
        )
    }
}
