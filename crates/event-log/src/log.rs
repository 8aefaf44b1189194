use async_trait::async_trait;

use crate::{AggregateId, EventLogError, RecordedEvent, Result, Snapshot, Version};

/// Options for appending events to the log.
#[derive(Debug, Clone, Default)]
pub struct AppendOptions {
    /// Expected version of the aggregate before the append.
    /// `None` skips the check (use with caution).
    pub expected_version: Option<Version>,
}

impl AppendOptions {
    /// Options with no version check.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options expecting the aggregate to be at a specific version.
    pub fn expect_version(version: Version) -> Self {
        Self {
            expected_version: Some(version),
        }
    }

    /// Options expecting the aggregate not to exist yet.
    pub fn expect_new() -> Self {
        Self {
            expected_version: Some(Version::initial()),
        }
    }
}

/// The append-only event log.
///
/// One strictly ordered stream of events per aggregate. The version check
/// and the append are a single atomic operation: no writer can interleave
/// between them, which is what makes the expected-version precondition a
/// correct substitute for locking.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Appends a batch of events for one aggregate.
    ///
    /// The batch is all-or-nothing. If `options.expected_version` is set and
    /// the stream has moved past it, the append fails with
    /// [`EventLogError::ConcurrencyConflict`] and nothing is recorded.
    ///
    /// Returns the version of the aggregate after the append.
    async fn append(&self, events: Vec<RecordedEvent>, options: AppendOptions) -> Result<Version>;

    /// Reads all events for an aggregate in version order (oldest first).
    ///
    /// An unknown aggregate yields an empty vector, not an error: the empty
    /// stream is the initial state.
    async fn read_all(&self, aggregate_id: AggregateId) -> Result<Vec<RecordedEvent>>;

    /// Reads events for an aggregate starting at `from_version` (inclusive).
    ///
    /// Used when replaying on top of a snapshot.
    async fn read_from(
        &self,
        aggregate_id: AggregateId,
        from_version: Version,
    ) -> Result<Vec<RecordedEvent>>;

    /// Returns the current version of an aggregate, or `None` if it has no
    /// recorded events.
    async fn current_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>>;

    /// Saves a snapshot of an aggregate's state, replacing any previous one.
    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<()>;

    /// Returns the latest snapshot for an aggregate, if any.
    async fn load_snapshot(&self, aggregate_id: AggregateId) -> Result<Option<Snapshot>>;
}

/// Convenience methods available on every [`EventLog`].
#[async_trait]
pub trait EventLogExt: EventLog {
    /// Appends a single event.
    async fn append_one(&self, event: RecordedEvent, options: AppendOptions) -> Result<Version> {
        self.append(vec![event], options).await
    }

    /// Returns true if the aggregate has at least one recorded event.
    async fn exists(&self, aggregate_id: AggregateId) -> Result<bool> {
        Ok(self.current_version(aggregate_id).await?.is_some())
    }

    /// Loads an aggregate's snapshot (if any) and the events recorded after
    /// it. Without a snapshot, returns all events.
    async fn load_aggregate(
        &self,
        aggregate_id: AggregateId,
    ) -> Result<(Option<Snapshot>, Vec<RecordedEvent>)> {
        if let Some(snapshot) = self.load_snapshot(aggregate_id).await? {
            let events = self
                .read_from(aggregate_id, snapshot.version.next())
                .await?;
            Ok((Some(snapshot), events))
        } else {
            let events = self.read_all(aggregate_id).await?;
            Ok((None, events))
        }
    }
}

// Blanket implementation for all EventLog implementations
impl<T: EventLog + ?Sized> EventLogExt for T {}

/// Validates an event batch before it is appended.
///
/// A batch must be non-empty, target a single aggregate, and carry strictly
/// sequential versions.
pub fn validate_batch(events: &[RecordedEvent]) -> Result<()> {
    let Some(first) = events.first() else {
        return Err(EventLogError::InvalidBatch {
            message: "cannot append an empty event batch".to_string(),
        });
    };

    for event in events.iter().skip(1) {
        if event.aggregate_id != first.aggregate_id {
            return Err(EventLogError::InvalidBatch {
                message: "all events in a batch must target the same aggregate".to_string(),
            });
        }
        if event.aggregate_type != first.aggregate_type {
            return Err(EventLogError::InvalidBatch {
                message: "all events in a batch must share the aggregate type".to_string(),
            });
        }
    }

    let mut expected = first.version;
    for event in events.iter().skip(1) {
        expected = expected.next();
        if event.version != expected {
            return Err(EventLogError::InvalidBatch {
                message: format!(
                    "event versions must be sequential: expected {expected}, got {}",
                    event.version
                ),
            });
        }
    }

    Ok(())
}
