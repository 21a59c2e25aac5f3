//! Wires configuration into collaborators and assembles the router.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use relay_auth::http::RelayState;
use relay_auth::upstream::{HttpUpstreamClient, HttpUpstreamClientConfig};
use relay_auth::validator::{HttpTokenValidator, HttpTokenValidatorConfig};
use relay_auth::{RelayError, RelayResult};
use relay_store_memory::{MemoryClientRegistry, MemoryTransactionStore};

use crate::config::AppConfig;

/// Builds handler state from configuration: the in-memory store and
/// registry plus the HTTP-backed upstream and validator collaborators.
pub fn build_state(cfg: &AppConfig) -> RelayResult<RelayState> {
    let upstream = HttpUpstreamClient::new(HttpUpstreamClientConfig::from_relay_config(&cfg.relay))?;

    let mut validator_cfg = HttpTokenValidatorConfig::new(cfg.validator.endpoint.clone());
    if let Some(api_key) = &cfg.validator.api_key {
        validator_cfg = validator_cfg.with_api_key(api_key);
    }
    let validator = HttpTokenValidator::new(validator_cfg)?;

    let registry = MemoryClientRegistry::new(
        cfg.clients.iter().cloned().map(Into::into).collect(),
    );
    if registry.is_empty() {
        return Err(RelayError::configuration(
            "no client applications configured",
        ));
    }

    Ok(RelayState {
        store: Arc::new(MemoryTransactionStore::new()),
        registry: Arc::new(registry),
        upstream: Arc::new(upstream),
        validator: Arc::new(validator),
        config: cfg.relay.clone(),
    })
}

/// Assembles the full application router: flow endpoints under the
/// configured base path, plus the health probe.
pub fn build_router(cfg: &AppConfig, state: RelayState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest(&cfg.server.base_path, relay_auth::router(state))
        .layer(TraceLayer::new_for_http())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "relay-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
