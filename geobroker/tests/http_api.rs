use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use geobroker::app_state::AppState;
use geobroker::auth::PassthroughTokenCache;
use geobroker::broker::Broker;
use geobroker::config::Config;
use geobroker::models::DeliverySemantic;
use geobroker::routes::build_router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_state(semantic: DeliverySemantic) -> AppState {
    let broker = Arc::new(Broker::new(None, semantic));
    let config = Arc::new(Config::default());
    AppState::new(broker, config, Arc::new(PassthroughTokenCache))
}

async fn call(
    state: AppState,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = if let Some(body) = body {
        builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    } else {
        builder.body(Body::empty()).unwrap()
    };

    let response = build_router(state).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn publish_body(topic: &str, request_id: &str, lat: f64, lon: f64) -> Value {
    json!({
        "Topic": topic,
        "Title": "eruption warning",
        "Message": "evacuate the area",
        "Radius": 10,
        "LifeTime": 60.0,
        "Latitude": lat,
        "Longitude": lon,
        "RequestID": request_id,
    })
}

#[tokio::test]
async fn health_check_reports_healthy() {
    let state = test_state(DeliverySemantic::AtMostOnce);
    let (status, body) = call(state, "GET", "/health", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn publish_requires_a_bearer_token() {
    let state = test_state(DeliverySemantic::AtMostOnce);
    let (status, _) = call(
        state,
        "POST",
        "/publish",
        &[],
        Some(publish_body("T1", "r1", 41.9, 12.5)),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn publish_then_subscribe_then_notifications_geo_hit() {
    let state = test_state(DeliverySemantic::AtMostOnce);

    let (status, body) = call(
        state.clone(),
        "POST",
        "/publish",
        &[("authorization", "Bearer tok")],
        Some(publish_body("T1", "r1", 41.9, 12.5)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "success");

    let (status, _) = call(
        state.clone(),
        "POST",
        "/editSubscription",
        &[("authorization", "Bearer tok"), ("x-user", "alice")],
        Some(json!({ "Topic": "T1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        state.clone(),
        "POST",
        "/notifications",
        &[("x-user", "alice")],
        Some(json!({ "Latitude": 41.95, "Longitude": 12.5, "Radius": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["topic"], "T1");

    let (status, body) = call(
        state,
        "POST",
        "/notifications",
        &[("x-user", "alice")],
        Some(json!({ "Latitude": 48.0, "Longitude": 2.0, "Radius": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn notifications_without_x_user_header_is_rejected() {
    let state = test_state(DeliverySemantic::AtMostOnce);
    let (status, _) = call(
        state,
        "POST",
        "/notifications",
        &[],
        Some(json!({ "Latitude": 0.0, "Longitude": 0.0, "Radius": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn duplicate_publish_under_at_most_once_is_suppressed() {
    let state = test_state(DeliverySemantic::AtMostOnce);

    for _ in 0..2 {
        let (status, body) = call(
            state.clone(),
            "POST",
            "/publish",
            &[("authorization", "Bearer tok")],
            Some(publish_body("T1", "dup", 41.9, 12.5)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "success");
    }

    let (_, body) = call(
        state,
        "POST",
        "/notifications",
        &[("x-user", "nobody")],
        Some(json!({ "Latitude": 0.0, "Longitude": 0.0, "Radius": 1 })),
    )
    .await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn remove_request_clears_the_idempotency_record() {
    let state = test_state(DeliverySemantic::AtMostOnce);
    call(
        state.clone(),
        "POST",
        "/publish",
        &[("authorization", "Bearer tok")],
        Some(publish_body("T1", "r1", 41.9, 12.5)),
    )
    .await;

    let (status, _) = call(
        state.clone(),
        "POST",
        "/removeRequest",
        &[("authorization", "Bearer tok")],
        Some(json!({ "RequestID": "r1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!state.broker.requests().contains("r1").await);
}
