//! Append-only event log, the sole source of truth for aggregate state.
//!
//! Each aggregate owns one strictly ordered stream of recorded events.
//! Appends are conditioned on an expected version, which makes the log the
//! single serialization point per aggregate: concurrent writers are detected,
//! never blocked.

pub mod error;
pub mod event;
pub mod log;
pub mod memory;
pub mod outbox;
pub mod snapshot;

pub use common::AggregateId;
pub use error::{EventLogError, Result};
pub use event::{EventId, RecordedEvent, RecordedEventBuilder, Version};
pub use log::{AppendOptions, EventLog, EventLogExt};
pub use memory::InMemoryEventLog;
pub use outbox::{InMemoryOutbox, Outbox};
pub use snapshot::Snapshot;
