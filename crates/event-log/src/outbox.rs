use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{RecordedEvent, Result};

/// Staging area for events that must reach downstream consumers.
///
/// After a successful append the application service hands the freshly
/// recorded events here. Delivery is at-least-once; the relay that drains
/// the outbox lives outside this crate.
#[async_trait]
pub trait Outbox: Send + Sync {
    /// Enqueues a batch of recorded events for downstream publication.
    async fn enqueue(&self, events: Vec<RecordedEvent>) -> Result<()>;
}

/// In-memory outbox for tests: remembers every enqueued event in order.
#[derive(Clone, Default)]
pub struct InMemoryOutbox {
    entries: Arc<RwLock<Vec<RecordedEvent>>>,
}

impl InMemoryOutbox {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events waiting in the outbox.
    pub async fn pending(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Removes and returns all pending events.
    pub async fn drain(&self) -> Vec<RecordedEvent> {
        std::mem::take(&mut *self.entries.write().await)
    }
}

#[async_trait]
impl Outbox for InMemoryOutbox {
    async fn enqueue(&self, events: Vec<RecordedEvent>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.extend(events);
        Ok(())
    }
}
