use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::models::Message;

/// Keyed message lists per topic, guarded by a single read/write lock.
/// Mirrors the shape of a `subscriptions: Arc<RwLock<HashMap<...>>>` field,
/// generalized from a per-client map to a per-topic one.
#[derive(Default)]
pub struct TopicIndex {
    topics: RwLock<HashMap<String, Vec<Message>>>,
}

impl TopicIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclusive lock for the whole append: either the list observably grows
    /// by one or the call makes no change.
    pub async fn append(&self, message: Message) {
        let mut topics = self.topics.write().await;
        topics.entry(message.topic.clone()).or_default().push(message);
    }

    /// Removes the last entry appended to `topic`, used to roll back a failed
    /// durable write.
    pub async fn remove_last(&self, topic: &str) {
        let mut topics = self.topics.write().await;
        if let Some(list) = topics.get_mut(topic) {
            list.pop();
        }
    }

    /// Stamps the durable row id onto the last entry appended to `topic`,
    /// once the durable write that assigned it has resolved.
    pub async fn set_last_id(&self, topic: &str, id: i64) {
        let mut topics = self.topics.write().await;
        if let Some(list) = topics.get_mut(topic) {
            if let Some(last) = list.last_mut() {
                last.id = Some(id);
            }
        }
    }

    /// Shared-read copy, safe for the caller to iterate without holding the lock.
    pub async fn snapshot(&self, topic: &str) -> Vec<Message> {
        let topics = self.topics.read().await;
        topics.get(topic).cloned().unwrap_or_default()
    }

    /// Removes expired entries from every topic. Order-agnostic: uses
    /// swap_remove so live entries may be reordered, matching the "ordering
    /// is not a guarantee exposed to readers" contract.
    pub async fn expire_all(&self, now: f64) -> usize {
        let mut topics = self.topics.write().await;
        let mut removed = 0;
        for list in topics.values_mut() {
            let mut i = 0;
            while i < list.len() {
                if list[i].is_expired(now) {
                    list.swap_remove(i);
                    removed += 1;
                } else {
                    i += 1;
                }
            }
        }
        removed
    }

    /// Removes expired entries from a single topic only (used by MessageExpiry,
    /// which sweeps one topic at a time).
    pub async fn expire_topic(&self, topic: &str, now: f64) -> usize {
        let mut topics = self.topics.write().await;
        let Some(list) = topics.get_mut(topic) else {
            return 0;
        };
        let mut removed = 0;
        let mut i = 0;
        while i < list.len() {
            if list[i].is_expired(now) {
                list.swap_remove(i);
                removed += 1;
            } else {
                i += 1;
            }
        }
        removed
    }

    pub async fn topic_names(&self) -> Vec<String> {
        self.topics.read().await.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(topic: &str, expiration_time: f64) -> Message {
        Message {
            id: None,
            topic: topic.to_string(),
            title: "t".to_string(),
            body: "b".to_string(),
            radius: 1,
            latitude: 0.0,
            longitude: 0.0,
            expiration_time,
            request_id: "r".to_string(),
        }
    }

    #[tokio::test]
    async fn append_increases_snapshot_length() {
        let idx = TopicIndex::new();
        idx.append(msg("T1", 100.0)).await;
        assert_eq!(idx.snapshot("T1").await.len(), 1);
    }

    #[tokio::test]
    async fn expire_removes_only_dead_entries() {
        let idx = TopicIndex::new();
        idx.append(msg("T1", 10.0)).await;
        idx.append(msg("T1", 1000.0)).await;
        let removed = idx.expire_topic("T1", 500.0).await;
        assert_eq!(removed, 1);
        let remaining = idx.snapshot("T1").await;
        assert_eq!(remaining.len(), 1);
        assert!(remaining[0].expiration_time > 500.0);
    }

    #[tokio::test]
    async fn rollback_removes_just_appended_entry() {
        let idx = TopicIndex::new();
        idx.append(msg("T1", 100.0)).await;
        idx.remove_last("T1").await;
        assert_eq!(idx.snapshot("T1").await.len(), 0);
    }

    #[tokio::test]
    async fn set_last_id_stamps_the_most_recently_appended_entry() {
        let idx = TopicIndex::new();
        idx.append(msg("T1", 100.0)).await;
        idx.append(msg("T1", 200.0)).await;
        idx.set_last_id("T1", 42).await;

        let entries = idx.snapshot("T1").await;
        assert_eq!(entries[0].id, None, "only the most recent entry is stamped");
        assert_eq!(entries[1].id, Some(42));
    }
}
