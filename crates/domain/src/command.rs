//! Command handling infrastructure.
//!
//! Implements the load → compute → append cycle: fold the aggregate from
//! its recorded events, run a pure command function against the folded
//! state, and append the produced events under an expected-version
//! precondition. A concurrent writer makes the append fail; the whole cycle
//! is then retried from a fresh load, a bounded number of times.

use std::marker::PhantomData;
use std::time::Instant;

use common::AggregateId;
use event_log::{
    AppendOptions, EventLog, EventLogError, EventLogExt, RecordedEvent, Snapshot, Version,
};
use serde::Serialize;

use crate::aggregate::{Aggregate, DomainEvent, SnapshotCapable};
use crate::error::DomainError;

/// Total attempts for an execution that keeps losing the version race.
/// Domain errors are never retried; only `ConcurrencyConflict` is, because
/// reloading re-evaluates every invariant against fresh state.
const MAX_CONFLICT_RETRIES: u32 = 3;

/// Result of a successfully executed command.
#[derive(Debug)]
pub struct CommandResult<A: Aggregate> {
    /// The aggregate after applying the new events.
    pub aggregate: A,

    /// The domain events that were produced and persisted.
    pub events: Vec<A::Event>,

    /// The persisted records, ready to hand to an outbox.
    pub records: Vec<RecordedEvent>,

    /// The aggregate version after the append.
    pub new_version: Version,
}

/// An intention to change one aggregate. May be rejected if the aggregate's
/// current state does not allow it.
pub trait Command: Send + Sync {
    /// The aggregate this command targets.
    type Aggregate: Aggregate;

    /// The id of the targeted aggregate.
    fn aggregate_id(&self) -> AggregateId;
}

/// Executes commands against aggregates stored in an event log.
pub struct CommandHandler<S, A>
where
    S: EventLog,
    A: Aggregate,
{
    log: S,
    _phantom: PhantomData<A>,
}

impl<S, A> CommandHandler<S, A>
where
    S: EventLog,
    A: Aggregate,
{
    /// Creates a handler backed by the given event log.
    pub fn new(log: S) -> Self {
        Self {
            log,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the underlying event log.
    pub fn log(&self) -> &S {
        &self.log
    }

    /// Folds an aggregate from its recorded stream.
    ///
    /// Returns the folded state and its version (0 when no events exist, in
    /// which case the state is `A::default()`). Starts from a snapshot when
    /// one is available.
    pub async fn load(&self, aggregate_id: AggregateId) -> Result<(A, Version), DomainError>
    where
        A: for<'de> serde::Deserialize<'de>,
    {
        let (snapshot, records) = self.log.load_aggregate(aggregate_id).await?;

        let (mut aggregate, mut version) = match snapshot {
            Some(snapshot) => {
                let version = snapshot.version;
                (serde_json::from_value(snapshot.state)?, version)
            }
            None => (A::default(), Version::initial()),
        };

        for record in records {
            let event: A::Event = serde_json::from_value(record.payload)?;
            aggregate.apply(event);
            version = record.version;
        }

        Ok((aggregate, version))
    }

    /// Loads an aggregate, returning `None` if it has no recorded events.
    pub async fn load_existing(&self, aggregate_id: AggregateId) -> Result<Option<A>, DomainError>
    where
        A: for<'de> serde::Deserialize<'de>,
    {
        let (aggregate, version) = self.load(aggregate_id).await?;
        if version == Version::initial() {
            Ok(None)
        } else {
            Ok(Some(aggregate))
        }
    }

    /// Executes a command function and persists the events it produces.
    ///
    /// `command_fn` receives the current folded state and returns either the
    /// events to record or a domain error. It must be pure: it is invoked
    /// again from scratch after a lost version race. An empty event vector
    /// is a no-op; nothing is persisted and the version is unchanged.
    pub async fn execute<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        A: for<'de> serde::Deserialize<'de>,
        A::Event: Serialize,
        F: Fn(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let started = Instant::now();
        let mut attempt = 1;

        let result = loop {
            let (mut aggregate, current_version) = self.load(aggregate_id).await?;

            let events = command_fn(&aggregate)?;

            if events.is_empty() {
                break CommandResult {
                    aggregate,
                    events: vec![],
                    records: vec![],
                    new_version: current_version,
                };
            }

            let records = self.build_records(aggregate_id, current_version, &events)?;

            let options = if current_version == Version::initial() {
                AppendOptions::expect_new()
            } else {
                AppendOptions::expect_version(current_version)
            };

            match self.log.append(records.clone(), options).await {
                Ok(new_version) => {
                    for event in &events {
                        aggregate.apply(event.clone());
                    }
                    break CommandResult {
                        aggregate,
                        events,
                        records,
                        new_version,
                    };
                }
                Err(EventLogError::ConcurrencyConflict {
                    expected, actual, ..
                }) if attempt < MAX_CONFLICT_RETRIES => {
                    metrics::counter!("domain_command_conflicts_total").increment(1);
                    tracing::warn!(
                        %aggregate_id,
                        %expected,
                        %actual,
                        attempt,
                        "version race lost, reloading and retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        metrics::counter!("domain_commands_total").increment(1);
        metrics::histogram!("domain_command_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        Ok(result)
    }

    /// Wraps domain events into records carrying sequential versions.
    fn build_records(
        &self,
        aggregate_id: AggregateId,
        current_version: Version,
        events: &[A::Event],
    ) -> Result<Vec<RecordedEvent>, DomainError>
    where
        A::Event: Serialize,
    {
        let mut records = Vec::with_capacity(events.len());
        let mut version = current_version;

        for event in events {
            version = version.next();
            let record = RecordedEvent::builder()
                .aggregate_id(aggregate_id)
                .aggregate_type(A::aggregate_type())
                .event_type(event.event_type())
                .version(version)
                .payload(event)?
                .build();
            records.push(record);
        }

        Ok(records)
    }
}

impl<S, A> CommandHandler<S, A>
where
    S: EventLog,
    A: SnapshotCapable,
{
    /// Executes a command and captures a snapshot when the aggregate crosses
    /// its snapshot interval.
    pub async fn execute_with_snapshot<F>(
        &self,
        aggregate_id: AggregateId,
        command_fn: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        A: for<'de> serde::Deserialize<'de>,
        A::Event: Serialize,
        F: Fn(&A) -> Result<Vec<A::Event>, A::Error>,
        DomainError: From<A::Error>,
    {
        let result = self.execute(aggregate_id, command_fn).await?;

        if A::should_snapshot(result.new_version) {
            let snapshot = Snapshot::from_state(
                aggregate_id,
                A::aggregate_type(),
                result.new_version,
                &result.aggregate,
            )?;
            self.log.save_snapshot(snapshot).await?;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_log::InMemoryEventLog;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize)]
    enum CounterEvent {
        Started { id: AggregateId },
        Incremented { by: i64 },
    }

    impl DomainEvent for CounterEvent {
        fn event_type(&self) -> &'static str {
            match self {
                CounterEvent::Started { .. } => "Started",
                CounterEvent::Incremented { .. } => "Incremented",
            }
        }
    }

    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    struct Counter {
        id: Option<AggregateId>,
        value: i64,
    }

    #[derive(Debug, thiserror::Error)]
    enum CounterError {
        #[error("not started")]
        NotStarted,
    }

    impl Aggregate for Counter {
        type Event = CounterEvent;
        type Error = CounterError;

        fn aggregate_type() -> &'static str {
            "Counter"
        }

        fn id(&self) -> Option<AggregateId> {
            self.id
        }

        fn apply(&mut self, event: Self::Event) {
            match event {
                CounterEvent::Started { id } => self.id = Some(id),
                CounterEvent::Incremented { by } => self.value += by,
            }
        }
    }

    impl From<CounterError> for DomainError {
        fn from(e: CounterError) -> Self {
            DomainError::AggregateNotFound {
                aggregate_type: "Counter",
                aggregate_id: e.to_string(),
            }
        }
    }

    #[tokio::test]
    async fn execute_records_and_applies_events() {
        let handler: CommandHandler<_, Counter> = CommandHandler::new(InMemoryEventLog::new());
        let id = AggregateId::new();

        let result = handler
            .execute(id, |_| Ok(vec![CounterEvent::Started { id }]))
            .await
            .unwrap();

        assert_eq!(result.new_version, Version::first());
        assert_eq!(result.aggregate.id(), Some(id));
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].event_type, "Started");
    }

    #[tokio::test]
    async fn execute_continues_an_existing_stream() {
        let handler: CommandHandler<_, Counter> = CommandHandler::new(InMemoryEventLog::new());
        let id = AggregateId::new();

        handler
            .execute(id, |_| Ok(vec![CounterEvent::Started { id }]))
            .await
            .unwrap();

        let result = handler
            .execute(id, |_| Ok(vec![CounterEvent::Incremented { by: 5 }]))
            .await
            .unwrap();

        assert_eq!(result.new_version, Version::new(2));
        assert_eq!(result.aggregate.value, 5);
    }

    #[tokio::test]
    async fn domain_errors_are_not_retried() {
        let handler: CommandHandler<_, Counter> = CommandHandler::new(InMemoryEventLog::new());
        let id = AggregateId::new();
        let calls = std::sync::atomic::AtomicU32::new(0);

        let result = handler
            .execute(id, |_: &Counter| {
                calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                Err(CounterError::NotStarted)
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_event_vector_is_a_no_op() {
        let log = InMemoryEventLog::new();
        let handler: CommandHandler<_, Counter> = CommandHandler::new(log.clone());
        let id = AggregateId::new();

        let result = handler.execute(id, |_| Ok(vec![])).await.unwrap();

        assert!(result.events.is_empty());
        assert_eq!(result.new_version, Version::initial());
        assert_eq!(log.event_count().await, 0);
    }

    #[tokio::test]
    async fn load_existing_distinguishes_unknown_aggregates() {
        let handler: CommandHandler<_, Counter> = CommandHandler::new(InMemoryEventLog::new());
        let id = AggregateId::new();

        assert!(handler.load_existing(id).await.unwrap().is_none());

        handler
            .execute(id, |_| Ok(vec![CounterEvent::Started { id }]))
            .await
            .unwrap();

        let loaded = handler.load_existing(id).await.unwrap();
        assert_eq!(loaded.unwrap().id(), Some(id));
    }

    #[tokio::test]
    async fn load_folds_the_full_stream() {
        let handler: CommandHandler<_, Counter> = CommandHandler::new(InMemoryEventLog::new());
        let id = AggregateId::new();

        handler
            .execute(id, |_| Ok(vec![CounterEvent::Started { id }]))
            .await
            .unwrap();
        handler
            .execute(id, |_| {
                Ok(vec![
                    CounterEvent::Incremented { by: 2 },
                    CounterEvent::Incremented { by: 3 },
                ])
            })
            .await
            .unwrap();

        let (counter, version) = handler.load(id).await.unwrap();
        assert_eq!(counter.value, 5);
        assert_eq!(version, Version::new(3));
    }

    impl SnapshotCapable for Counter {
        fn snapshot_interval() -> usize {
            2
        }
    }

    #[tokio::test]
    async fn snapshots_are_captured_at_the_interval() {
        let log = InMemoryEventLog::new();
        let handler: CommandHandler<_, Counter> = CommandHandler::new(log.clone());
        let id = AggregateId::new();

        handler
            .execute_with_snapshot(id, |_| Ok(vec![CounterEvent::Started { id }]))
            .await
            .unwrap();
        assert!(log.load_snapshot(id).await.unwrap().is_none());

        handler
            .execute_with_snapshot(id, |_| Ok(vec![CounterEvent::Incremented { by: 7 }]))
            .await
            .unwrap();

        let snapshot = log.load_snapshot(id).await.unwrap().unwrap();
        assert_eq!(snapshot.version, Version::new(2));

        // Loading starts from the snapshot and finds the same state.
        let (counter, version) = handler.load(id).await.unwrap();
        assert_eq!(counter.value, 7);
        assert_eq!(version, Version::new(2));
    }
}
