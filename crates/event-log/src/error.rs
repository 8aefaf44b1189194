use thiserror::Error;

use crate::{AggregateId, Version};

/// Errors that can occur when interacting with the event log.
#[derive(Debug, Error)]
pub enum EventLogError {
    /// The expected version did not match the version actually found in the
    /// log, meaning another writer appended first.
    #[error(
        "concurrency conflict for aggregate {aggregate_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        aggregate_id: AggregateId,
        expected: Version,
        actual: Version,
    },

    /// The aggregate has no recorded events.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(AggregateId),

    /// The event batch handed to `append` was malformed.
    #[error("invalid append batch: {message}")]
    InvalidBatch { message: String },

    /// A serialization/deserialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for event log operations.
pub type Result<T> = std::result::Result<T, EventLogError>;
