use std::collections::HashMap;

use tokio::sync::RwLock;

/// Keyed topic lists per user, guarded by the same read/write lock scheme as
/// TopicIndex.
#[derive(Default)]
pub struct SubscriptionIndex {
    users: RwLock<HashMap<String, Vec<String>>>,
}

impl SubscriptionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn subscribe(&self, user: &str, topic: &str) {
        let mut users = self.users.write().await;
        let topics = users.entry(user.to_string()).or_default();
        if !topics.contains(&topic.to_string()) {
            topics.push(topic.to_string());
        }
    }

    /// Removes all occurrences of `topic` for `user`; deletes the user key if
    /// the list becomes empty.
    pub async fn unsubscribe(&self, user: &str, topic: &str) {
        let mut users = self.users.write().await;
        if let Some(topics) = users.get_mut(user) {
            topics.retain(|t| t != topic);
            if topics.is_empty() {
                users.remove(user);
            }
        }
    }

    pub async fn is_subscribed(&self, user: &str, topic: &str) -> bool {
        let users = self.users.read().await;
        users
            .get(user)
            .map(|topics| topics.iter().any(|t| t == topic))
            .unwrap_or(false)
    }

    pub async fn topics_of(&self, user: &str) -> Vec<String> {
        let users = self.users.read().await;
        users.get(user).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribe_then_unsubscribe_restores_prior_state() {
        let idx = SubscriptionIndex::new();
        let before = idx.topics_of("alice").await;
        idx.subscribe("alice", "T1").await;
        idx.unsubscribe("alice", "T1").await;
        let after = idx.topics_of("alice").await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn duplicate_subscribe_is_a_no_op() {
        let idx = SubscriptionIndex::new();
        idx.subscribe("alice", "T1").await;
        idx.subscribe("alice", "T1").await;
        assert_eq!(idx.topics_of("alice").await, vec!["T1".to_string()]);
    }

    #[tokio::test]
    async fn empty_user_entry_is_pruned() {
        let idx = SubscriptionIndex::new();
        idx.subscribe("alice", "T1").await;
        idx.unsubscribe("alice", "T1").await;
        assert!(!idx.is_subscribed("alice", "T1").await);
    }
}
