use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use axum::Json;
use tracing::info;

use crate::app_state::AppState;
use crate::auth::extract_bearer;
use crate::broker::PublishOutcome;
use crate::error::BrokerError;
use crate::models::{
    EditSubscriptionRequest, MessageView, NotificationsRequest, PublishRequest,
    RemoveRequestRequest,
};

/// Auth gate for mutating endpoints: the broker's sole observable use of the
/// external token cache is this existence check.
pub async fn require_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(headers.get(axum::http::header::AUTHORIZATION));
    match token {
        Some(token) if state.token_cache.exists(token).await => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

fn current_user(headers: &HeaderMap) -> Result<String, BrokerError> {
    headers
        .get("x-user")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(BrokerError::InvalidInput("x-user header"))
}

pub async fn publish_handler(
    State(state): State<AppState>,
    Json(payload): Json<PublishRequest>,
) -> Result<Json<&'static str>, BrokerError> {
    info!("publishing to topic {}", payload.topic);
    match state.broker.publish(payload).await? {
        PublishOutcome::Success => Ok(Json("success")),
        PublishOutcome::Fail => Ok(Json("fail")),
    }
}

pub async fn edit_subscription_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<EditSubscriptionRequest>,
) -> Result<Json<serde_json::Value>, BrokerError> {
    let user = current_user(&headers)?;
    let now_subscribed = state.broker.edit_subscription(&user, &payload.topic).await?;
    let message = if now_subscribed { "subscribed" } else { "unsubscribed" };
    Ok(Json(serde_json::json!({ "status": message, "topic": payload.topic })))
}

pub async fn notifications_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<NotificationsRequest>,
) -> Result<Json<Vec<MessageView>>, BrokerError> {
    let user = current_user(&headers)?;
    let results = state
        .broker
        .notifications(&user, payload.latitude, payload.longitude, payload.radius)
        .await;
    Ok(Json(results))
}

pub async fn remove_request_handler(
    State(state): State<AppState>,
    Json(payload): Json<RemoveRequestRequest>,
) -> StatusCode {
    state.broker.remove_request(&payload.request_id).await;
    StatusCode::OK
}

pub async fn health_handler(State(state): State<AppState>) -> Result<Json<serde_json::Value>, BrokerError> {
    if let Some(mirror) = state.broker.mirror() {
        sqlx::query("SELECT 1").execute(mirror.pool()).await?;
    }
    Ok(Json(serde_json::json!({ "status": "healthy" })))
}
