use std::sync::Arc;

use clap::Parser;
use geobroker::app_state::AppState;
use geobroker::auth::PassthroughTokenCache;
use geobroker::broker::Broker;
use geobroker::config::{Config, Options};
use geobroker::database::DurableMirror;
use geobroker::expiry::ExpiryCollectors;
use geobroker::routes::build_router;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let options = Options::parse();
    let config = Config::load(&options);

    let mirror = if config.db_persistence {
        Some(DurableMirror::connect(&config.database_file).await?)
    } else {
        None
    };

    let broker = Arc::new(Broker::new(mirror, config.delivery_semantic));
    broker.warn_if_volatile();
    broker.hydrate().await?;

    let cancellation = CancellationToken::new();
    let message_expiry = ExpiryCollectors::spawn_message_expiry(
        broker.clone(),
        config.garbage_collector_period,
        cancellation.clone(),
    );
    let request_expiry = ExpiryCollectors::spawn_request_expiry(
        broker.clone(),
        config.elimination_period,
        config.request_lifetime,
        cancellation.clone(),
    );

    let state = AppState::new(broker, Arc::new(config.clone()), Arc::new(PassthroughTokenCache));

    let app = build_router(state).layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.app_listening_port);
    info!("geobrokerd listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancellation.cancel();
    let _ = tokio::join!(message_expiry, request_expiry);

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
