use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::DispatchError;
use crate::models::{QueueEntry, Semantic};
use crate::pool::ConsumerPool;
use crate::queue::ReadyQueue;

/// The single-threaded dispatch loop: while the queue is non-empty, select
/// the head and dispatch it according to its semantic. Each iteration is one
/// attempt; the loop itself never blocks the whole process because every RPC
/// call is awaited, not synchronous.
pub struct QueueDispatcher {
    queue: Arc<ReadyQueue>,
    pool: Arc<ConsumerPool>,
}

impl QueueDispatcher {
    pub fn new(queue: Arc<ReadyQueue>, pool: Arc<ConsumerPool>) -> Self {
        Self { queue, pool }
    }

    pub fn spawn(self, idle_poll: Duration, cancellation: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancellation.cancelled() => {
                        info!("queue dispatcher stopping");
                        return;
                    }
                    _ = self.run_once(idle_poll) => {}
                }
            }
        })
    }

    pub async fn run_once(&self, idle_poll: Duration) -> Result<(), DispatchError> {
        let Some(head) = self.queue.next().await else {
            tokio::time::sleep(idle_poll).await;
            return Ok(());
        };

        if self.pool.is_empty() {
            tokio::time::sleep(idle_poll).await;
            return Err(DispatchError::EmptyPool);
        }

        let result = match head.semantic {
            Semantic::AtLeastOnce => self.dispatch_at_least_once(head).await,
            Semantic::TimeoutBased => self.dispatch_timeout_based(head).await,
        };
        if let Err(ref e) = result {
            warn!("dispatch attempt failed: {}", e);
        }
        result
    }

    /// Retries the same consumer until an error-free reply is observed, then
    /// deletes the entry and advances the round-robin index. Retries never
    /// move the head or touch the pool index.
    async fn dispatch_at_least_once(&self, head: QueueEntry) -> Result<(), DispatchError> {
        let timeout = Duration::from_secs(head.timeout_secs.max(1));
        let consumer = self.pool.current();
        let reply = consumer.procedure(head.clone()).await;

        match reply {
            Ok(_) => {
                self.queue.remove(head.seq).await;
                self.pool.advance();
                Ok(())
            }
            Err(reason) => {
                tokio::time::sleep(timeout).await;
                Err(DispatchError::ConsumerFailed { seq: head.seq, reason })
            }
        }
    }

    /// Marks the entry invisible, races the RPC reply against its own
    /// timeout, and restores visibility on expiry instead of deleting it —
    /// the entry becomes eligible for the next loop iteration, possibly to a
    /// different consumer once the pool's current index has moved on.
    async fn dispatch_timeout_based(&self, head: QueueEntry) -> Result<(), DispatchError> {
        self.queue.set_visible(head.seq, false).await;
        let timeout = Duration::from_secs(head.timeout_secs.max(1));

        let consumer = self.pool.current();
        let call = consumer.procedure(head.clone());

        match tokio::time::timeout(timeout, call).await {
            Ok(_) => {
                self.queue.remove(head.seq).await;
                self.pool.advance();
                Ok(())
            }
            Err(_) => {
                self.queue.set_visible(head.seq, true).await;
                Err(DispatchError::Timeout(head.seq))
            }
        }
    }
}
