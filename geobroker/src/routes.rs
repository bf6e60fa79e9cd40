use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;
use crate::handlers::{
    edit_subscription_handler, health_handler, notifications_handler, publish_handler,
    remove_request_handler, require_token,
};

/// Builds the full HTTP/JSON facade. Split out of `main` so both the
/// binary and the integration tests construct the exact same router.
pub fn build_router(state: AppState) -> Router {
    let mutating_routes = Router::new()
        .route("/publish", post(publish_handler))
        .route("/editSubscription", post(edit_subscription_handler))
        .route("/removeRequest", post(remove_request_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .merge(mutating_routes)
        .route("/notifications", post(notifications_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
