use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, warn};

use crate::database::DurableMirror;
use crate::error::BrokerError;
use crate::geo::circles_intersect;
use crate::models::{DeliverySemantic, Message, MessageView, PublishRequest};
use crate::request_filter::RequestFilter;
use crate::subscription_index::SubscriptionIndex;
use crate::topic_index::TopicIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishOutcome {
    Success,
    Fail,
}

/// Owns the three in-memory indexes and the optional durable mirror, the same
/// way a `Broker` owns its subscription map plus a `SqlitePool` connection —
/// generalized from a single map to topics, subscriptions, and in-flight
/// request records.
pub struct Broker {
    topics: TopicIndex,
    subscriptions: SubscriptionIndex,
    requests: RequestFilter,
    mirror: Option<DurableMirror>,
    semantic: DeliverySemantic,
}

pub fn now_unix() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

impl Broker {
    pub fn new(mirror: Option<DurableMirror>, semantic: DeliverySemantic) -> Self {
        Self {
            topics: TopicIndex::new(),
            subscriptions: SubscriptionIndex::new(),
            requests: RequestFilter::new(),
            mirror,
            semantic,
        }
    }

    /// Replays durable state into memory before the broker serves traffic.
    /// A no-op when persistence is disabled.
    pub async fn hydrate(&self) -> Result<(), BrokerError> {
        let Some(mirror) = &self.mirror else {
            return Ok(());
        };
        let (messages, subscriptions) = mirror.hydrate().await?;
        for message in messages {
            self.topics.append(message).await;
        }
        for (user, topic) in subscriptions {
            self.subscriptions.subscribe(&user, &topic).await;
        }
        Ok(())
    }

    pub async fn publish(&self, req: PublishRequest) -> Result<PublishOutcome, BrokerError> {
        if req.topic.is_empty() {
            return Err(BrokerError::InvalidInput("topic"));
        }
        if req.request_id.is_empty() {
            return Err(BrokerError::InvalidInput("request_id"));
        }

        let now = now_unix();

        // Duplicate suppression: at-most-once/exactly-once only.
        if self.semantic.deduplicates() && self.requests.contains(&req.request_id).await {
            return Ok(PublishOutcome::Success);
        }

        let message = Message {
            id: None,
            topic: req.topic.clone(),
            title: req.title,
            body: req.message,
            radius: req.radius,
            latitude: req.latitude,
            longitude: req.longitude,
            expiration_time: now + req.life_time * 60.0,
            request_id: req.request_id.clone(),
        };

        self.topics.append(message.clone()).await;

        if let Some(mirror) = &self.mirror {
            match mirror.insert_message(&message).await {
                Ok(id) => self.topics.set_last_id(&message.topic, id).await,
                Err(e) => {
                    error!("durable write failed for publish on {}: {}", message.topic, e);
                    self.topics.remove_last(&message.topic).await;
                    return Ok(PublishOutcome::Fail);
                }
            }
        }

        if self.semantic.deduplicates() {
            self.requests.insert(&req.request_id, now).await;
        }

        Ok(PublishOutcome::Success)
    }

    /// Toggles the (user, topic) subscription.
    pub async fn edit_subscription(&self, user: &str, topic: &str) -> Result<bool, BrokerError> {
        let now_subscribed = self.subscriptions.is_subscribed(user, topic).await;

        if now_subscribed {
            self.subscriptions.unsubscribe(user, topic).await;
        } else {
            self.subscriptions.subscribe(user, topic).await;
        }

        if let Some(mirror) = &self.mirror {
            let result = if now_subscribed {
                mirror.delete_subscription(user, topic).await
            } else {
                mirror.insert_subscription(user, topic).await
            };
            if let Err(e) = result {
                error!("durable write failed for subscription edit on {}/{}: {}", user, topic, e);
                return Err(BrokerError::Durable(e));
            }
        }

        Ok(!now_subscribed)
    }

    pub async fn notifications(
        &self,
        user: &str,
        view_lat: f64,
        view_lon: f64,
        view_radius: i64,
    ) -> Vec<MessageView> {
        let topics = self.subscriptions.topics_of(user).await;
        let mut out = Vec::new();
        for topic in topics {
            let snapshot = self.topics.snapshot(&topic).await;
            for message in &snapshot {
                if circles_intersect(
                    view_lat,
                    view_lon,
                    view_radius,
                    message.latitude,
                    message.longitude,
                    message.radius,
                ) {
                    out.push(MessageView::from(message));
                }
            }
        }
        out
    }

    pub async fn remove_request(&self, request_id: &str) {
        self.requests.delete(request_id).await;
    }

    pub fn topics(&self) -> &TopicIndex {
        &self.topics
    }

    pub fn requests(&self) -> &RequestFilter {
        &self.requests
    }

    pub fn mirror(&self) -> Option<&DurableMirror> {
        self.mirror.as_ref()
    }

    pub fn warn_if_volatile(&self) {
        if self.mirror.is_none() {
            warn!("db-persistence disabled: broker is volatile, restart will not hydrate state");
        }
    }
}
