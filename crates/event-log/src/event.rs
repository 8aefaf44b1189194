use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AggregateId;

/// Unique identifier for a recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an event ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of an event in an aggregate's stream, used for optimistic
/// concurrency control.
///
/// Version 0 means "no events recorded yet"; the first event of an aggregate
/// carries version 1 and each subsequent event increments by 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// The version of an aggregate with no events (0).
    pub fn initial() -> Self {
        Self(0)
    }

    /// The version carried by the first event (1).
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Version> for i64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

/// A domain event as recorded in the log, together with the metadata needed
/// to replay it: which aggregate it belongs to, its position in that
/// aggregate's stream, and when it was recorded.
///
/// The payload is stored as JSON so the log stays agnostic of the domain
/// event types (e.g. `"ChapterAdded"` for a book draft).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedEvent {
    /// Unique identifier for this event.
    pub event_id: EventId,

    /// The type of the event (e.g. "DraftCreated", "MovedToEditing").
    pub event_type: String,

    /// The aggregate this event belongs to.
    pub aggregate_id: AggregateId,

    /// The type of aggregate (e.g. "Book").
    pub aggregate_type: String,

    /// The version of the aggregate after this event.
    pub version: Version,

    /// When the event was recorded.
    pub timestamp: DateTime<Utc>,

    /// The event payload as JSON.
    pub payload: serde_json::Value,

    /// Additional metadata (correlation ids and the like).
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RecordedEvent {
    /// Creates a new builder.
    pub fn builder() -> RecordedEventBuilder {
        RecordedEventBuilder::default()
    }
}

/// Builder for [`RecordedEvent`].
#[derive(Debug, Default)]
pub struct RecordedEventBuilder {
    event_id: Option<EventId>,
    event_type: Option<String>,
    aggregate_id: Option<AggregateId>,
    aggregate_type: Option<String>,
    version: Option<Version>,
    timestamp: Option<DateTime<Utc>>,
    payload: Option<serde_json::Value>,
    metadata: HashMap<String, serde_json::Value>,
}

impl RecordedEventBuilder {
    /// Sets the event ID. A random one is generated if not set.
    pub fn event_id(mut self, id: EventId) -> Self {
        self.event_id = Some(id);
        self
    }

    /// Sets the event type.
    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    /// Sets the aggregate ID.
    pub fn aggregate_id(mut self, id: AggregateId) -> Self {
        self.aggregate_id = Some(id);
        self
    }

    /// Sets the aggregate type.
    pub fn aggregate_type(mut self, aggregate_type: impl Into<String>) -> Self {
        self.aggregate_type = Some(aggregate_type.into());
        self
    }

    /// Sets the version of the aggregate after this event.
    pub fn version(mut self, version: Version) -> Self {
        self.version = Some(version);
        self
    }

    /// Sets the timestamp. The current time is used if not set.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Serializes and sets the payload.
    pub fn payload<T: Serialize>(mut self, payload: &T) -> Result<Self, serde_json::Error> {
        self.payload = Some(serde_json::to_value(payload)?);
        Ok(self)
    }

    /// Sets the payload from a raw JSON value.
    pub fn payload_raw(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Adds a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Builds the recorded event.
    ///
    /// # Panics
    ///
    /// Panics if `event_type`, `aggregate_id`, `aggregate_type`, `version`
    /// or `payload` are not set.
    pub fn build(self) -> RecordedEvent {
        RecordedEvent {
            event_id: self.event_id.unwrap_or_default(),
            event_type: self.event_type.expect("event_type is required"),
            aggregate_id: self.aggregate_id.expect("aggregate_id is required"),
            aggregate_type: self.aggregate_type.expect("aggregate_type is required"),
            version: self.version.expect("version is required"),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            payload: self.payload.expect("payload is required"),
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_id_new_creates_unique_ids() {
        assert_ne!(EventId::new(), EventId::new());
    }

    #[test]
    fn version_ordering() {
        assert!(Version::initial() < Version::first());
        assert_eq!(Version::first(), Version::initial().next());
        assert_eq!(Version::new(5).next(), Version::new(6));
    }

    #[test]
    fn version_serializes_transparently() {
        let json = serde_json::to_string(&Version::new(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn builder_fills_defaults() {
        let record = RecordedEvent::builder()
            .aggregate_id(AggregateId::new())
            .aggregate_type("Book")
            .event_type("DraftCreated")
            .version(Version::first())
            .payload_raw(serde_json::json!({"title": "Domain-Driven Design"}))
            .build();

        assert_eq!(record.event_type, "DraftCreated");
        assert_eq!(record.aggregate_type, "Book");
        assert_eq!(record.version, Version::first());
        assert!(record.metadata.is_empty());
    }

    #[test]
    fn builder_serializes_payload() {
        #[derive(Serialize)]
        struct Payload {
            isbn: String,
        }

        let record = RecordedEvent::builder()
            .aggregate_id(AggregateId::new())
            .aggregate_type("Book")
            .event_type("IsbnSet")
            .version(Version::new(4))
            .payload(&Payload {
                isbn: "978-0321125217".to_string(),
            })
            .unwrap()
            .metadata("correlation_id", serde_json::json!("abc"))
            .build();

        assert_eq!(record.payload["isbn"], "978-0321125217");
        assert_eq!(record.metadata["correlation_id"], "abc");
    }

    #[test]
    #[should_panic(expected = "event_type is required")]
    fn builder_panics_without_event_type() {
        RecordedEvent::builder()
            .aggregate_id(AggregateId::new())
            .aggregate_type("Book")
            .version(Version::first())
            .payload_raw(serde_json::json!({}))
            .build();
    }

    #[test]
    fn recorded_event_roundtrip() {
        let record = RecordedEvent::builder()
            .aggregate_id(AggregateId::new())
            .aggregate_type("Book")
            .event_type("ReviewerAdded")
            .version(Version::new(3))
            .payload_raw(serde_json::json!({"name": "R. Martin"}))
            .build();

        let json = serde_json::to_string(&record).unwrap();
        let back: RecordedEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.event_id, record.event_id);
        assert_eq!(back.version, record.version);
        assert_eq!(back.payload, record.payload);
    }
}
