use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AggregateId, Version};

/// A point-in-time capture of an aggregate's folded state.
///
/// Purely an optimization: loading starts from the snapshot and replays only
/// the events recorded after it. The event stream stays the source of truth;
/// a snapshot can always be discarded and rebuilt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// The aggregate this snapshot belongs to.
    pub aggregate_id: AggregateId,

    /// The type of aggregate (e.g. "Book").
    pub aggregate_type: String,

    /// The version of the aggregate at the time of the snapshot.
    pub version: Version,

    /// When the snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// The serialized aggregate state.
    pub state: serde_json::Value,
}

impl Snapshot {
    /// Creates a snapshot from a raw JSON state.
    pub fn new(
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        version: Version,
        state: serde_json::Value,
    ) -> Self {
        Self {
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            version,
            timestamp: Utc::now(),
            state,
        }
    }

    /// Serializes `state` and creates a snapshot from it.
    pub fn from_state<T: Serialize>(
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        version: Version,
        state: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            aggregate_id,
            aggregate_type,
            version,
            serde_json::to_value(state)?,
        ))
    }

    /// Deserializes the captured state into a concrete type.
    pub fn into_state<T: for<'de> Deserialize<'de>>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.state)
    }
}
