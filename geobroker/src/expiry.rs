use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::broker::{now_unix, Broker};

/// Two independent periodic sweepers, built on the `purge_old_data` pattern
/// (`tokio::time::interval`, skip-first-tick, tracing on completion) —
/// generalized into two collectors instead of one combined purge, and acting
/// on the in-memory indexes (plus the durable mirror) in place of a DB-only
/// purge.
pub struct ExpiryCollectors;

impl ExpiryCollectors {
    /// Every `period_minutes`, for each topic: delete durable rows with
    /// `lifetime <= now`, then remove in-memory expired entries. Order
    /// between the two doesn't matter; both are idempotent.
    pub fn spawn_message_expiry(
        broker: Arc<Broker>,
        period_minutes: u64,
        cancellation: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(period_minutes.max(1) * 60));
            interval.tick().await; // skip the immediate first tick.

            loop {
                tokio::select! {
                    _ = cancellation.cancelled() => {
                        info!("message expiry collector stopping");
                        return;
                    }
                    _ = interval.tick() => {}
                }

                let now = now_unix();
                let topics = broker.topics().topic_names().await;
                for topic in topics {
                    if let Some(mirror) = broker.mirror() {
                        if let Err(e) = mirror.delete_expired(&topic, now).await {
                            error!("message expiry: durable delete failed for {}: {}", topic, e);
                        }
                    }
                    let removed = broker.topics().expire_topic(&topic, now).await;
                    if removed > 0 {
                        info!("message expiry: removed {} entries from {}", removed, topic);
                    }
                }
            }
        })
    }

    /// Every `period_minutes`, sweep RequestFilter for records older than
    /// `lifetime_minutes`.
    pub fn spawn_request_expiry(
        broker: Arc<Broker>,
        period_minutes: u64,
        lifetime_minutes: f64,
        cancellation: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(period_minutes.max(1) * 60));
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = cancellation.cancelled() => {
                        info!("request expiry collector stopping");
                        return;
                    }
                    _ = interval.tick() => {}
                }

                let now = now_unix();
                let evicted = broker.requests().sweep(now, lifetime_minutes).await;
                if evicted > 0 {
                    info!("request expiry: evicted {} stale records", evicted);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliverySemantic;

    #[tokio::test]
    async fn message_expiry_removes_topic_list_after_lifetime() {
        let broker = Arc::new(Broker::new(None, DeliverySemantic::AtMostOnce));
        broker
            .publish(crate::models::PublishRequest {
                topic: "T1".to_string(),
                title: "t".to_string(),
                message: "m".to_string(),
                radius: 10,
                life_time: 1.0,
                latitude: 0.0,
                longitude: 0.0,
                request_id: "r1".to_string(),
            })
            .await
            .unwrap();

        let future_now = now_unix() + 2.0 * 60.0;
        let removed = broker.topics().expire_topic("T1", future_now).await;
        assert_eq!(removed, 1);
        assert!(broker.topics().snapshot("T1").await.is_empty());
    }
}
