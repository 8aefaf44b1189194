//! Domain error types.
//!
//! Every error maps to a stable machine-readable code via
//! [`DomainError::code`], so a transport layer can translate failures
//! without inspecting message text.

use event_log::EventLogError;
use thiserror::Error;

use crate::book::{BookError, ProviderError};

/// Errors that can occur while handling a command.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the event log.
    #[error("event log error: {0}")]
    EventLog(#[from] EventLogError),

    /// A book invariant or phase check failed.
    #[error("book error: {0}")]
    Book(BookError),

    /// Command targeted an aggregate with no recorded events.
    #[error("aggregate not found: {aggregate_type} with id {aggregate_id}")]
    AggregateNotFound {
        aggregate_type: &'static str,
        aggregate_id: String,
    },

    /// An external collaborator (author/publisher lookup, genre quota)
    /// failed. Propagated as-is; not a domain rejection.
    #[error("collaborator failure: {0}")]
    Collaborator(#[from] ProviderError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::EventLog(EventLogError::ConcurrencyConflict { .. }) => {
                "concurrency_conflict"
            }
            DomainError::EventLog(_) => "event_log_error",
            DomainError::Book(e) => e.code(),
            DomainError::AggregateNotFound { .. } => "aggregate_not_found",
            DomainError::Collaborator(_) => "collaborator_failure",
            DomainError::Serialization(_) => "serialization_error",
        }
    }

    /// True when the caller may retry the same command unchanged.
    ///
    /// Only lost version races qualify: re-running re-evaluates the
    /// invariants against fresh state. Everything else needs different
    /// input or a state change first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DomainError::EventLog(EventLogError::ConcurrencyConflict { .. })
        )
    }
}
