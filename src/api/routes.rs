use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::observability::track_http_requests;
use crate::storage::VaultStores;
use crate::vault::VaultService;

use super::{
    docs,
    handlers::{
        client_handler, health_handler, not_found_handler, ready_handler, secret_handler,
    },
};

#[derive(Debug, Clone)]
pub struct ApiState {
    pub vault: VaultService,
    pub stores: VaultStores,
}

impl ApiState {
    pub fn new(vault: VaultService, stores: VaultStores) -> Self {
        Self { vault, stores }
    }
}

/// Router with default server limits
pub fn build_router(state: ApiState) -> Router {
    build_router_with_config(state, &ServerConfig::default())
}

pub fn build_router_with_config(state: ApiState, config: &ServerConfig) -> Router {
    let vault_routes = Router::new()
        .route("/api/vault/{kind}/{client_id}", any(client_handler))
        .route("/api/vault/{kind}/{client_id}/{secret_id}", any(secret_handler));

    Router::new()
        .route("/health", get(health_handler))
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .merge(vault_routes)
        .merge(docs::docs_router())
        .fallback(not_found_handler)
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(middleware::from_fn(track_http_requests))
        .layer(request_timeout(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Requests running past the configured timeout answer 408
fn request_timeout(config: &ServerConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.timeout())
}
