//! Axum HTTP handlers for the relay's protocol surface.
//!
//! Three routes make up the core:
//!
//! | Method | Path         | Purpose                     |
//! |--------|--------------|-----------------------------|
//! | GET    | `/authorize` | begin authorization         |
//! | GET    | `/redirect`  | upstream callback           |
//! | POST   | `/token`     | code / refresh exchange     |
//!
//! Each handler owns its error-to-status mapping: the authorize and
//! redirect paths answer 400 for anything the caller got wrong (including
//! unknown state, so existence is not leaked), while the token path
//! answers 401 for anything credential-equivalent and passes upstream
//! rejections through verbatim.

pub mod authorize;
pub mod redirect;
pub mod token;

use std::sync::Arc;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};

use crate::config::RelayConfig;
use crate::oauth::ErrorBody;
use crate::store::{ClientRegistry, TransactionStore};
use crate::upstream::UpstreamClient;
use crate::validator::TokenValidator;

pub use authorize::authorize_handler;
pub use redirect::redirect_handler;
pub use token::token_handler;

/// Shared state injected into every handler.
///
/// All collaborators are trait objects so tests (and alternative
/// deployments) can swap implementations without touching the handlers.
#[derive(Clone)]
pub struct RelayState {
    /// Transaction persistence.
    pub store: Arc<dyn TransactionStore>,
    /// Registered-application lookup.
    pub registry: Arc<dyn ClientRegistry>,
    /// Upstream provider token endpoint client.
    pub upstream: Arc<dyn UpstreamClient>,
    /// Identity-claims validation service client.
    pub validator: Arc<dyn TokenValidator>,
    /// Immutable relay configuration.
    pub config: RelayConfig,
}

/// Builds the relay router. Mount it under the deployment's base path.
pub fn router(state: RelayState) -> axum::Router {
    axum::Router::new()
        .route("/authorize", get(authorize_handler))
        .route("/redirect", get(redirect_handler))
        .route("/token", post(token_handler))
        .with_state(state)
}

/// 400 response with an OAuth-style JSON error body.
pub(crate) fn bad_request(error: &str, description: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody::new(error, description)),
    )
        .into_response()
}

/// 500 response for unexpected collaborator failures.
pub(crate) fn server_error(description: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new("server_error", description)),
    )
        .into_response()
}

/// 302 redirect. Axum's `Redirect` helpers answer 303/307/308; OAuth
/// redirect legs are specified as 302 Found.
pub(crate) fn found(location: &url::Url) -> Response {
    (
        StatusCode::FOUND,
        [(axum::http::header::LOCATION, location.to_string())],
    )
        .into_response()
}
