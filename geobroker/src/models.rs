use serde::{Deserialize, Serialize};

/// A publish request as decoded from the `/publish` HTTP body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PublishRequest {
    pub topic: String,
    pub title: String,
    pub message: String,
    pub radius: i64,
    /// Minutes until the message expires.
    pub life_time: f64,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "RequestID")]
    pub request_id: String,
}

/// An immutable message once accepted by the broker.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: Option<i64>,
    pub topic: String,
    pub title: String,
    pub body: String,
    pub radius: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Absolute wall-clock instant (unix seconds) past which the message is dead.
    pub expiration_time: f64,
    pub request_id: String,
}

impl Message {
    pub fn is_expired(&self, now: f64) -> bool {
        self.expiration_time <= now
    }
}

/// `delivery-semantic` config key: governs RequestFilter idempotency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliverySemantic {
    AtLeastOnce,
    AtMostOnce,
    ExactlyOnce,
}

impl DeliverySemantic {
    /// Whether RequestFilter participates in publish: only at-least-once
    /// skips deduplication entirely.
    pub fn deduplicates(self) -> bool {
        !matches!(self, DeliverySemantic::AtLeastOnce)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EditSubscriptionRequest {
    pub topic: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationsRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RemoveRequestRequest {
    #[serde(rename = "RequestID")]
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub topic: String,
    pub title: String,
    pub message: String,
    pub radius: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Message> for MessageView {
    fn from(m: &Message) -> Self {
        Self {
            topic: m.topic.clone(),
            title: m.title.clone(),
            message: m.body.clone(),
            radius: m.radius,
            latitude: m.latitude,
            longitude: m.longitude,
        }
    }
}
