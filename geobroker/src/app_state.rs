use std::sync::Arc;

use crate::auth::TokenCache;
use crate::broker::Broker;
use crate::config::Config;

/// Shared application state injected into every Axum handler: the broker,
/// its resolved configuration, and the token cache gating mutating routes.
#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<Broker>,
    pub config: Arc<Config>,
    pub token_cache: Arc<dyn TokenCache>,
}

impl AppState {
    pub fn new(broker: Arc<Broker>, config: Arc<Config>, token_cache: Arc<dyn TokenCache>) -> Self {
        Self { broker, config, token_cache }
    }
}
