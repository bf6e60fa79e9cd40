use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Errors surfaced by the broker facade. Input errors never mutate state;
/// durable-store errors roll back the in-memory append they were guarding.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("missing or invalid field: {0}")]
    InvalidInput(&'static str),

    #[error("durable store error: {0}")]
    Durable(#[from] sqlx::Error),
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let status = match &self {
            BrokerError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            BrokerError::Durable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
