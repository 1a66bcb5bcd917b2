//! # Event Entities
//!
//! - [`EmittedEvent`]: what an upstream source pushes.
//! - [`EventRecord`]: what a subscriber receives.

use crate::filter::Registration;
use crate::level::{EventLevel, Keywords};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered payload: field name to value, in emission order.
pub type Payload = Vec<(String, Value)>;

/// A record as pushed by an upstream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmittedEvent {
    /// Event id, unique within its source.
    pub id: i32,
    /// Event name.
    pub name: String,
    /// Name of the emitting source.
    pub source_name: String,
    /// Severity.
    pub level: EventLevel,
    /// Keyword tags.
    pub keywords: Keywords,
    /// Formatted message, when the source defines one.
    pub message: Option<String>,
    /// Event schema version.
    pub version: u8,
    /// Payload fields.
    pub payload: Payload,
    /// Emission timestamp.
    pub created_at: DateTime<Utc>,
}

impl EmittedEvent {
    /// Create an event with an empty payload, stamped now.
    #[must_use]
    pub fn new(source_name: impl Into<String>, id: i32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            source_name: source_name.into(),
            level: EventLevel::Informational,
            keywords: Keywords::NONE,
            message: None,
            version: 0,
            payload: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Set the severity.
    #[must_use]
    pub fn with_level(mut self, level: EventLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the keyword tags.
    #[must_use]
    pub fn with_keywords(mut self, keywords: impl Into<Keywords>) -> Self {
        self.keywords = keywords.into();
        self
    }

    /// Set the message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Append a payload field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.push((name.into(), value.into()));
        self
    }

    /// Build a payload from parallel name and value lists.
    ///
    /// Extra names or values beyond the shorter list are ignored.
    #[must_use]
    pub fn with_payload_columns(mut self, names: &[&str], values: Vec<Value>) -> Self {
        self.payload = names
            .iter()
            .zip(values)
            .map(|(name, value)| ((*name).to_string(), value))
            .collect();
        self
    }
}

/// A record delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Event id, unique within its source.
    pub id: i32,
    /// Event name.
    pub name: String,
    /// Name of the emitting source.
    pub source_name: String,
    /// Severity.
    pub level: EventLevel,
    /// Keyword tags.
    pub keywords: Keywords,
    /// Formatted message, when the source defines one.
    pub message: Option<String>,
    /// Event schema version.
    pub version: u8,
    /// Payload fields, in emission order.
    pub payload: Payload,
    /// Emission timestamp.
    pub created_at: DateTime<Utc>,
    /// When the dispatcher received the record.
    pub listened_at: DateTime<Utc>,
    /// Enablement in force for the source.
    pub registration: Registration,
}

impl EventRecord {
    /// Convert an emitted event into a deliverable record.
    #[must_use]
    pub fn from_emitted(
        event: EmittedEvent,
        registration: Registration,
        listened_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: event.id,
            name: event.name,
            source_name: event.source_name,
            level: event.level,
            keywords: event.keywords,
            message: event.message,
            version: event.version,
            payload: event.payload,
            created_at: event.created_at,
            listened_at,
            registration,
        }
    }

    /// Look up a payload field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }
}
