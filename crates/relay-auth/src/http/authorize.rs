//! GET /authorize: begin an authorization transaction.
//!
//! Validates the client's parameters, persists a new transaction keyed by
//! `state`, and answers 302 toward the upstream provider's authorization
//! endpoint with the relay's own credentials substituted in. The client's
//! `redirect_uri` is exact-matched against the application's registered
//! list here, at creation time; later flow steps trust the stored value.

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::error::RelayError;
use crate::types::Transaction;

use super::{RelayState, bad_request, found, server_error};

/// Query parameters accepted by the authorize endpoint.
///
/// All fields are optional at the parsing layer so missing values produce
/// a protocol-level 400 rather than an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
    #[serde(default)]
    redirect_uri: Option<String>,
}

/// Handles GET /authorize.
pub async fn authorize_handler(
    State(relay): State<RelayState>,
    Query(params): Query<AuthorizeParams>,
) -> Response {
    let Some(state) = params.state.filter(|s| !s.is_empty()) else {
        return bad_request("invalid_request", "state is required");
    };
    let Some(client_id) = params.client_id.filter(|s| !s.is_empty()) else {
        return bad_request("invalid_request", "client_id is required");
    };
    let Some(redirect_uri) = params.redirect_uri.filter(|s| !s.is_empty()) else {
        return bad_request("invalid_request", "redirect_uri is required");
    };

    let application = match relay.registry.find_by_client_id(&client_id).await {
        Ok(Some(application)) => application,
        Ok(None) => {
            tracing::warn!(client_id = %client_id, "Authorization attempt by unknown client");
            return bad_request("invalid_request", "Unknown client_id");
        }
        Err(err) => {
            tracing::error!(error = %err, "Client registry lookup failed");
            return server_error("Client lookup failed");
        }
    };

    if !application.is_redirect_uri_registered(&redirect_uri) {
        tracing::warn!(
            client_id = %client_id,
            redirect_uri = %redirect_uri,
            "redirect_uri is not registered for the client"
        );
        return bad_request("invalid_request", "redirect_uri is not registered");
    }

    let txn = Transaction::new(&state, &client_id, &redirect_uri);
    match relay.store.create(txn).await {
        Ok(_) => {}
        Err(RelayError::Conflict { .. }) => {
            return bad_request("invalid_request", "state is already in use");
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to persist transaction");
            return server_error("Failed to persist transaction");
        }
    }

    let location = upstream_authorization_url(&relay, &state);
    tracing::info!(client_id = %client_id, "Authorization transaction created");
    found(&location)
}

/// Builds the upstream authorization URL for a transaction.
///
/// The relay substitutes its own client_id and callback; the client's
/// `state` rides along unchanged so the upstream echoes it back on the
/// redirect leg.
fn upstream_authorization_url(relay: &RelayState, state: &str) -> url::Url {
    let mut location = relay.config.upstream.authorization_endpoint.clone();
    location
        .query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", &relay.config.upstream.client_id)
        .append_pair("redirect_uri", relay.config.redirect_url.as_str())
        .append_pair("scope", &relay.config.upstream.scope)
        .append_pair("state", state);
    location
}

#[cfg(test)]
mod tests {
    use super::super::tests::{TestRelay, body_json, get};
    use crate::store::TransactionStore;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_authorize_redirects_to_upstream_with_relay_credentials() {
        let relay = TestRelay::new();
        let response = get(
            relay.router(),
            "/authorize?state=st-1&client_id=web-app&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb",
        )
        .await;

        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response.headers()["location"].to_str().unwrap();
        assert!(location.starts_with("https://idp.example.com/authorize?"));
        assert!(location.contains("response_type=code"));
        assert!(location.contains("client_id=relay"));
        assert!(location.contains("state=st-1"));
        assert!(location.contains("redirect_uri=https%3A%2F%2Frelay.example.com%2Foauth2%2Fredirect"));
        // The client's own callback must not leak upstream.
        assert!(!location.contains("app.example.com"));

        let txn = relay.store.get_by_state("st-1").await.unwrap();
        assert_eq!(txn.client_id, "web-app");
        assert_eq!(txn.redirect_uri, "https://app.example.com/cb");
        assert!(txn.code.is_none());
    }

    #[tokio::test]
    async fn test_missing_parameters_rejected() {
        let relay = TestRelay::new();
        for uri in [
            "/authorize",
            "/authorize?client_id=web-app&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb",
            "/authorize?state=st&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb",
            "/authorize?state=st&client_id=web-app",
        ] {
            let response = get(relay.router(), uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
            let body = body_json(response).await;
            assert_eq!(body["error"], "invalid_request");
        }
    }

    #[tokio::test]
    async fn test_unknown_client_rejected() {
        let relay = TestRelay::new();
        let response = get(
            relay.router(),
            "/authorize?state=st&client_id=ghost&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unregistered_redirect_uri_rejected() {
        let relay = TestRelay::new();
        let response = get(
            relay.router(),
            "/authorize?state=st&client_id=web-app&redirect_uri=https%3A%2F%2Fevil.example.com%2Fcb",
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(relay.store.get_by_state("st").await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_state_rejected() {
        let relay = TestRelay::new();
        let uri =
            "/authorize?state=st-dup&client_id=web-app&redirect_uri=https%3A%2F%2Fapp.example.com%2Fcb";

        let first = get(relay.router(), uri).await;
        assert_eq!(first.status(), StatusCode::FOUND);

        let second = get(relay.router(), uri).await;
        assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    }
}
