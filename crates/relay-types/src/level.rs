//! # Severity Levels and Keyword Masks
//!
//! Verbosity hints carried by filters and registrations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Ordered event severity.
///
/// Higher values are more verbose: a source enabled at `Informational`
/// emits `Critical`, `Error`, `Warning` and `Informational` records, but
/// not `Verbose` ones. `LogAlways` records pass any enablement, and a
/// source enabled at `LogAlways` emits every record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum EventLevel {
    /// Emitted regardless of the enabled level.
    #[default]
    LogAlways = 0,
    /// Unrecoverable failures.
    Critical = 1,
    /// Failures.
    Error = 2,
    /// Conditions that may lead to failures.
    Warning = 3,
    /// Routine operational events.
    Informational = 4,
    /// Everything, including high-frequency diagnostics.
    Verbose = 5,
}

impl EventLevel {
    /// Whether a source enabled at `self` emits a record at `record_level`.
    #[must_use]
    pub fn admits(self, record_level: EventLevel) -> bool {
        self == EventLevel::LogAlways
            || record_level == EventLevel::LogAlways
            || record_level <= self
    }

    /// The enablement admitting at least what `self` and `other` admit.
    ///
    /// `LogAlways` admits everything and wins over any other level.
    #[must_use]
    pub fn widest(self, other: EventLevel) -> EventLevel {
        if self == EventLevel::LogAlways || other == EventLevel::LogAlways {
            EventLevel::LogAlways
        } else {
            self.max(other)
        }
    }
}

impl fmt::Display for EventLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LogAlways => "log_always",
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Informational => "informational",
            Self::Verbose => "verbose",
        };
        f.write_str(name)
    }
}

/// 64-bit keyword bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Keywords(pub u64);

impl Keywords {
    /// No keyword bits set.
    pub const NONE: Self = Self(0);

    /// Every keyword bit set.
    pub const ALL: Self = Self(u64::MAX);

    /// Whether no bits are set.
    #[must_use]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Whether `self` and `other` share at least one bit.
    #[must_use]
    pub fn intersects(self, other: Keywords) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether a source enabled with mask `self` emits a record tagged with
    /// `record`.
    ///
    /// An empty enabled mask admits everything, and untagged records pass
    /// any mask.
    #[must_use]
    pub fn admits(self, record: Keywords) -> bool {
        self.is_none() || record.is_none() || self.intersects(record)
    }
}

impl BitOr for Keywords {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Keywords {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<u64> for Keywords {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl fmt::Display for Keywords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}
