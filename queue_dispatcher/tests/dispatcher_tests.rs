use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use queue_dispatcher::dispatcher::QueueDispatcher;
use queue_dispatcher::models::{QueueEntry, Semantic};
use queue_dispatcher::pool::ConsumerPool;
use queue_dispatcher::queue::ReadyQueue;
use queue_dispatcher::rpc::ConsumerRpc;

struct CountingConsumer {
    hits: AtomicUsize,
}

#[async_trait]
impl ConsumerRpc for CountingConsumer {
    async fn procedure(&self, entry: QueueEntry) -> Result<QueueEntry, String> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        Ok(entry)
    }
}

/// Over N consecutive successful dispatches to a k-consumer pool, each
/// consumer should receive either `floor(N/k)` or `ceil(N/k)` messages.
#[tokio::test(start_paused = true)]
async fn round_robin_fairness_across_many_dispatches() {
    let consumers: Vec<Arc<CountingConsumer>> =
        (0..3).map(|_| Arc::new(CountingConsumer { hits: AtomicUsize::new(0) })).collect();
    let pool_clients: Vec<Arc<dyn ConsumerRpc>> =
        consumers.iter().map(|c| c.clone() as Arc<dyn ConsumerRpc>).collect();

    let queue = Arc::new(ReadyQueue::new());
    let pool = Arc::new(ConsumerPool::new(pool_clients));
    let dispatcher = QueueDispatcher::new(queue.clone(), pool);

    const N: usize = 11;
    for i in 0..N {
        queue.insert(QueueEntry::new(format!("m{i}"), Semantic::AtLeastOnce, 1)).await;
    }
    for _ in 0..N {
        let _ = dispatcher.run_once(Duration::from_millis(1)).await;
    }

    assert!(queue.is_empty().await);
    let counts: Vec<usize> = consumers.iter().map(|c| c.hits.load(Ordering::SeqCst)).collect();
    let floor = N / consumers.len();
    let ceil = floor + if N % consumers.len() == 0 { 0 } else { 1 };
    for count in counts {
        assert!(count == floor || count == ceil, "got {count}, expected {floor} or {ceil}");
    }
}

/// A consumer that always errors never lets the head advance: the dispatcher
/// keeps retrying seq 0 and never reaches seq 1.
#[tokio::test(start_paused = true)]
async fn stuck_head_blocks_later_entries_until_it_is_removed() {
    struct AlwaysFails;
    #[async_trait]
    impl ConsumerRpc for AlwaysFails {
        async fn procedure(&self, _entry: QueueEntry) -> Result<QueueEntry, String> {
            Err("permanent failure".to_string())
        }
    }

    let pool = Arc::new(ConsumerPool::new(vec![Arc::new(AlwaysFails) as Arc<dyn ConsumerRpc>]));
    let queue = Arc::new(ReadyQueue::new());
    let dispatcher = QueueDispatcher::new(queue.clone(), pool);

    queue.insert(QueueEntry::new("poison".to_string(), Semantic::AtLeastOnce, 1)).await;
    queue.insert(QueueEntry::new("later".to_string(), Semantic::AtLeastOnce, 1)).await;

    for _ in 0..5 {
        let _ = dispatcher.run_once(Duration::from_millis(1)).await;
    }

    let remaining = queue.snapshot().await;
    assert_eq!(remaining.len(), 2, "no entry should ever be removed without an ack");
    let head = queue.next().await.unwrap();
    assert_eq!(head.message, "poison");
}
