//! # Source Catalogs
//!
//! A [`SourceCatalog`] names a well-known source together with the keyword
//! mask its events are published under, so that producers and subscribers
//! agree on both without repeating them at every filter.
//!
//! ```ignore
//! const HTTP: SourceCatalog = SourceCatalog::new("http-client", Keywords(0x4));
//!
//! let filters = vec![HTTP.all_errors(), HTTP.event(12, EventLevel::Verbose)];
//! ```

use crate::filter::SourceFilter;
use crate::level::{EventLevel, Keywords};

/// Named source with a fixed keyword mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceCatalog {
    source_name: &'static str,
    keywords: Keywords,
}

impl SourceCatalog {
    #[must_use]
    pub const fn new(source_name: &'static str, keywords: Keywords) -> Self {
        Self {
            source_name,
            keywords,
        }
    }

    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source_name
    }

    #[must_use]
    pub fn keywords(&self) -> Keywords {
        self.keywords
    }

    /// One event of the source at `level`.
    #[must_use]
    pub fn event(&self, event_id: i32, level: EventLevel) -> SourceFilter {
        SourceFilter::exact(self.source_name, event_id, level).with_keywords(self.keywords)
    }

    /// Every event of the source at `level`.
    #[must_use]
    pub fn all(&self, level: EventLevel) -> SourceFilter {
        SourceFilter::wildcard(self.source_name, level).with_keywords(self.keywords)
    }

    #[must_use]
    pub fn all_critical(&self) -> SourceFilter {
        self.all(EventLevel::Critical)
    }

    #[must_use]
    pub fn all_errors(&self) -> SourceFilter {
        self.all(EventLevel::Error)
    }

    #[must_use]
    pub fn all_warnings(&self) -> SourceFilter {
        self.all(EventLevel::Warning)
    }

    #[must_use]
    pub fn all_informational(&self) -> SourceFilter {
        self.all(EventLevel::Informational)
    }

    #[must_use]
    pub fn all_verbose(&self) -> SourceFilter {
        self.all(EventLevel::Verbose)
    }
}
