//! Core aggregate and domain event traits.

use common::AggregateId;
use event_log::Version;
use serde::{Serialize, de::DeserializeOwned};

/// A fact that has happened in the domain, named in past tense.
pub trait DomainEvent: Serialize + DeserializeOwned + Send + Sync + Clone {
    /// The event type name used for storage and filtering.
    fn event_type(&self) -> &'static str;
}

/// An event-sourced aggregate.
///
/// An aggregate is the consistency boundary for a cluster of domain objects.
/// It is never persisted directly: its state is always
/// `fold(evolve, initial, events)` over its recorded stream, where `evolve`
/// is the [`apply`](Aggregate::apply) method.
pub trait Aggregate: Default + Send + Sync + Sized {
    /// The events this aggregate produces and consumes.
    type Event: DomainEvent;

    /// The domain errors its command handlers can produce.
    type Error: std::error::Error + Send + Sync;

    /// The aggregate type name, used for stream organization.
    fn aggregate_type() -> &'static str;

    /// The aggregate's identifier, `None` before the first event.
    fn id(&self) -> Option<AggregateId>;

    /// Applies one event, evolving the aggregate to its next state.
    ///
    /// Must be pure and deterministic: same state and event, same result,
    /// no side effects, no clock or randomness. Events are validated by the
    /// command handlers before they are ever recorded, so `apply` trusts
    /// its input; receiving an event that is illegal for the current state
    /// is a programming error and must panic rather than be ignored.
    fn apply(&mut self, event: Self::Event);

    /// Applies events in sequence.
    fn apply_events(&mut self, events: impl IntoIterator<Item = Self::Event>) {
        for event in events {
            self.apply(event);
        }
    }
}

/// Aggregates whose folded state may be captured periodically so loading
/// does not replay the whole stream.
pub trait SnapshotCapable: Aggregate + Serialize + DeserializeOwned {
    /// Number of events between snapshots.
    fn snapshot_interval() -> usize {
        100
    }

    /// Whether a snapshot should be taken at the given version.
    fn should_snapshot(version: Version) -> bool {
        version.as_i64() > 0 && (version.as_i64() as usize).is_multiple_of(Self::snapshot_interval())
    }
}
