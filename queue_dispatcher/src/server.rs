use std::sync::Arc;

use tarpc::context;

use crate::models::QueueEntry;
use crate::queue::ReadyQueue;
use crate::rpc::Queue;

/// Implements the producer-facing `Queue` service against a shared
/// `ReadyQueue`.
#[derive(Clone)]
pub struct QueueServer {
    queue: Arc<ReadyQueue>,
}

impl QueueServer {
    pub fn new(queue: Arc<ReadyQueue>) -> Self {
        Self { queue }
    }
}

impl Queue for QueueServer {
    async fn queue_insert(self, _: context::Context, entry: QueueEntry) -> QueueEntry {
        self.queue.insert(entry).await
    }

    async fn get_queue(self, _: context::Context) -> Vec<QueueEntry> {
        self.queue.snapshot().await
    }
}
