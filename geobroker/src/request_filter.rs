use std::collections::HashMap;

use tokio::sync::RwLock;

/// Idempotency record for at-most-once / exactly-once delivery. Keyed by
/// publisher-supplied `requestID`, value is insertion time (unix seconds) so
/// `sweep` can evict anything older than `lifetime` minutes.
#[derive(Default)]
pub struct RequestFilter {
    records: RwLock<HashMap<String, f64>>,
}

impl RequestFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, request_id: &str) -> bool {
        self.records.read().await.contains_key(request_id)
    }

    pub async fn insert(&self, request_id: &str, now: f64) {
        self.records.write().await.insert(request_id.to_string(), now);
    }

    pub async fn delete(&self, request_id: &str) {
        self.records.write().await.remove(request_id);
    }

    /// Deletes any record older than `lifetime_minutes` as of `now`.
    pub async fn sweep(&self, now: f64, lifetime_minutes: f64) -> usize {
        let cutoff = lifetime_minutes * 60.0;
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, inserted_at| now - *inserted_at <= cutoff);
        before - records.len()
    }
}
