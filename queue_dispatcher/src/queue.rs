use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::models::QueueEntry;

/// Insertion-ordered `seq -> QueueEntry` mapping plus an auxiliary
/// insertion-order list. `next()` scans that order for the first
/// still-present, visible entry rather than keeping a separate priority
/// structure.
#[derive(Default)]
pub struct ReadyQueue {
    entries: RwLock<HashMap<u64, QueueEntry>>,
    order: RwLock<Vec<u64>>,
    next_seq: AtomicU64,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next sequence number and appends the entry.
    pub async fn insert(&self, mut entry: QueueEntry) -> QueueEntry {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        entry.seq = seq;
        self.order.write().await.push(seq);
        self.entries.write().await.insert(seq, entry.clone());
        entry
    }

    /// Smallest seq among still-queued, visible entries — the dispatcher's head.
    pub async fn next(&self) -> Option<QueueEntry> {
        let order = self.order.read().await;
        let entries = self.entries.read().await;
        order
            .iter()
            .filter_map(|seq| entries.get(seq))
            .find(|e| e.visible)
            .cloned()
    }

    pub async fn set_visible(&self, seq: u64, visible: bool) {
        if let Some(entry) = self.entries.write().await.get_mut(&seq) {
            entry.visible = visible;
        }
    }

    /// Removes `seq` from both the map and the order list. Idempotent.
    pub async fn remove(&self, seq: u64) {
        self.entries.write().await.remove(&seq);
        self.order.write().await.retain(|s| *s != seq);
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn snapshot(&self) -> Vec<QueueEntry> {
        self.entries.read().await.values().cloned().collect()
    }
}
