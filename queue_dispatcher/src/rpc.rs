use async_trait::async_trait;
use tarpc::context;
use tokio::sync::Mutex;

use crate::models::QueueEntry;

/// `API.QueueInsert` / `API.GetQueue` — the producer-facing half of the
/// original `API` service. Producers dial the dispatcher and call either
/// procedure; the dispatcher itself never initiates these calls.
#[tarpc::service]
pub trait Queue {
    /// Enqueues `entry`; the server assigns `seq` and returns the stored copy.
    async fn queue_insert(entry: QueueEntry) -> QueueEntry;

    /// Snapshot of every entry currently known to the dispatcher, visibility included.
    async fn get_queue() -> Vec<QueueEntry>;
}

/// `API.Procedure` — the consumer-facing half. The dispatcher dials every
/// configured consumer and calls this once per dispatch attempt. An `Err`
/// return is the at-least-once retry signal; under timeout-based semantics
/// the dispatcher instead races this future against a timer and never
/// inspects the error variant directly.
#[tarpc::service]
pub trait Consumer {
    async fn procedure(entry: QueueEntry) -> Result<QueueEntry, String>;
}

/// Seam the dispatch loop calls through, the same role `TokenCache` plays for
/// the broker's auth gate: production wires a real tarpc `ConsumerClient`,
/// tests wire a plain in-process stub, and `QueueDispatcher` never knows the
/// difference.
#[async_trait]
pub trait ConsumerRpc: Send + Sync {
    async fn procedure(&self, entry: QueueEntry) -> Result<QueueEntry, String>;
}

/// Wraps a connected `ConsumerClient` behind `ConsumerRpc`. The mutex matches
/// the generated client's `&mut self` call convention while still letting
/// `ConsumerPool` share one handle across concurrent dispatch attempts.
pub struct ConsumerHandle {
    client: Mutex<ConsumerClient>,
}

impl ConsumerHandle {
    pub fn new(client: ConsumerClient) -> Self {
        Self { client: Mutex::new(client) }
    }
}

#[async_trait]
impl ConsumerRpc for ConsumerHandle {
    async fn procedure(&self, entry: QueueEntry) -> Result<QueueEntry, String> {
        let mut client = self.client.lock().await;
        match client.procedure(context::current(), entry).await {
            Ok(inner) => inner,
            Err(e) => Err(e.to_string()),
        }
    }
}
