//! # Relay Types
//!
//! Data model shared by the relay engine, its producers and its consumers.
//!
//! ## Design Principles
//!
//! - **Upstream shape vs delivered shape**: producers push [`EmittedEvent`];
//!   subscribers receive [`EventRecord`], which adds the listen timestamp and
//!   the [`Registration`] the source was enabled with.
//! - **Filters route, registrations configure**: a [`SourceFilter`] matches on
//!   source name and optional event id only. Its level and keywords feed the
//!   per-source [`Registration`], which controls upstream verbosity.

pub mod catalog;
pub mod entities;
pub mod errors;
pub mod filter;
pub mod level;

pub use catalog::*;
pub use entities::*;
pub use errors::*;
pub use filter::*;
pub use level::*;
