use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    AggregateId, EventLogError, RecordedEvent, Result, Snapshot, Version,
    log::{AppendOptions, EventLog, validate_batch},
};

/// In-memory event log.
///
/// Streams live in a map keyed by aggregate id, each a `Vec` in append
/// order. The write lock held across version-check and extend is the atomic
/// append the [`EventLog`] contract requires.
#[derive(Clone, Default)]
pub struct InMemoryEventLog {
    streams: Arc<RwLock<HashMap<AggregateId, Vec<RecordedEvent>>>>,
    snapshots: Arc<RwLock<HashMap<AggregateId, Snapshot>>>,
}

impl InMemoryEventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of recorded events across all aggregates.
    pub async fn event_count(&self) -> usize {
        self.streams.read().await.values().map(Vec::len).sum()
    }

    /// Clears all events and snapshots.
    pub async fn clear(&self) {
        self.streams.write().await.clear();
        self.snapshots.write().await.clear();
    }
}

#[async_trait]
impl EventLog for InMemoryEventLog {
    async fn append(&self, events: Vec<RecordedEvent>, options: AppendOptions) -> Result<Version> {
        validate_batch(&events)?;

        let aggregate_id = events[0].aggregate_id;
        let mut streams = self.streams.write().await;
        let stream = streams.entry(aggregate_id).or_default();

        let current_version = stream
            .last()
            .map(|e| e.version)
            .unwrap_or_else(Version::initial);

        if let Some(expected) = options.expected_version
            && current_version != expected
        {
            return Err(EventLogError::ConcurrencyConflict {
                aggregate_id,
                expected,
                actual: current_version,
            });
        }

        // Even without an expected version the stream must stay gapless.
        if events[0].version != current_version.next() {
            return Err(EventLogError::ConcurrencyConflict {
                aggregate_id,
                expected: options.expected_version.unwrap_or(current_version),
                actual: current_version,
            });
        }

        let new_version = events
            .last()
            .map(|e| e.version)
            .unwrap_or(current_version);
        let appended = events.len();
        stream.extend(events);

        tracing::debug!(%aggregate_id, %new_version, appended, "events appended");

        Ok(new_version)
    }

    async fn read_all(&self, aggregate_id: AggregateId) -> Result<Vec<RecordedEvent>> {
        let streams = self.streams.read().await;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn read_from(
        &self,
        aggregate_id: AggregateId,
        from_version: Version,
    ) -> Result<Vec<RecordedEvent>> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(&aggregate_id)
            .map(|stream| {
                stream
                    .iter()
                    .filter(|e| e.version >= from_version)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn current_version(&self, aggregate_id: AggregateId) -> Result<Option<Version>> {
        let streams = self.streams.read().await;
        Ok(streams
            .get(&aggregate_id)
            .and_then(|stream| stream.last())
            .map(|e| e.version))
    }

    async fn save_snapshot(&self, snapshot: Snapshot) -> Result<()> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(snapshot.aggregate_id, snapshot);
        Ok(())
    }

    async fn load_snapshot(&self, aggregate_id: AggregateId) -> Result<Option<Snapshot>> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(&aggregate_id).cloned())
    }
}
