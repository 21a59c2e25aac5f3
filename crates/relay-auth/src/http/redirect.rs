//! GET /redirect: the upstream provider's callback leg.
//!
//! The upstream echoes the client's `state` together with the
//! authorization code it issued. The handler stores the code on the
//! matching transaction and bounces the browser to the client's own
//! callback, which was validated and pinned when the transaction was
//! created. An unknown state answers 400 and mutates nothing.

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::error::RelayError;
use crate::types::TransactionUpdate;

use super::{RelayState, bad_request, found, server_error};

/// Query parameters the upstream sends on the callback.
#[derive(Debug, Deserialize)]
pub struct RedirectParams {
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Handles GET /redirect.
pub async fn redirect_handler(
    State(relay): State<RelayState>,
    Query(params): Query<RedirectParams>,
) -> Response {
    let Some(state) = params.state.filter(|s| !s.is_empty()) else {
        return bad_request("invalid_request", "state is required");
    };
    let Some(code) = params.code.filter(|s| !s.is_empty()) else {
        return bad_request("invalid_request", "code is required");
    };

    let txn = match relay
        .store
        .update(&state, TransactionUpdate::new().with_code(&code))
        .await
    {
        Ok(txn) => txn,
        Err(RelayError::NotFound { .. }) => {
            tracing::warn!("Upstream callback for unknown state");
            return bad_request("invalid_request", "Unknown state");
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to record authorization code");
            return server_error("Failed to record authorization code");
        }
    };

    let mut location = match url::Url::parse(&txn.redirect_uri) {
        Ok(location) => location,
        Err(err) => {
            tracing::error!(error = %err, "Stored redirect_uri is not a valid URL");
            return server_error("Stored redirect_uri is not a valid URL");
        }
    };
    location
        .query_pairs_mut()
        .append_pair("state", &state)
        .append_pair("code", &code);

    tracing::info!(client_id = %txn.client_id, "Authorization code recorded");
    found(&location)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{TestRelay, get};
    use crate::store::TransactionStore;
    use crate::types::Transaction;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_redirect_stores_code_and_bounces_to_client() {
        let relay = TestRelay::new();
        relay
            .seed_transaction(Transaction::new(
                "st-1",
                "web-app",
                "https://app.example.com/cb",
            ))
            .await;

        let response = get(relay.router(), "/redirect?state=st-1&code=code-abc").await;
        assert_eq!(response.status(), StatusCode::FOUND);

        let location = response.headers()["location"].to_str().unwrap();
        assert!(location.starts_with("https://app.example.com/cb?"));
        assert!(location.contains("state=st-1"));
        assert!(location.contains("code=code-abc"));

        let txn = relay.store.get_by_state("st-1").await.unwrap();
        assert_eq!(txn.code.as_deref(), Some("code-abc"));
    }

    #[tokio::test]
    async fn test_unknown_state_rejected_without_mutation() {
        let relay = TestRelay::new();
        let response = get(relay.router(), "/redirect?state=ghost&code=code-abc").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(relay.store.get_by_code("code-abc").await.is_err());
    }

    #[tokio::test]
    async fn test_missing_parameters_rejected() {
        let relay = TestRelay::new();
        relay
            .seed_transaction(Transaction::new(
                "st-1",
                "web-app",
                "https://app.example.com/cb",
            ))
            .await;

        for uri in ["/redirect", "/redirect?state=st-1", "/redirect?code=c"] {
            let response = get(relay.router(), uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
        }
        assert!(relay.store.get_by_state("st-1").await.unwrap().code.is_none());
    }

    #[tokio::test]
    async fn test_callback_preserves_existing_query_parameters() {
        let relay = TestRelay::new();
        relay
            .seed_transaction(Transaction::new(
                "st-2",
                "web-app",
                "https://app.example.com/cb?env=prod",
            ))
            .await;

        let response = get(relay.router(), "/redirect?state=st-2&code=c2").await;
        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response.headers()["location"].to_str().unwrap();
        assert!(location.contains("env=prod"));
        assert!(location.contains("code=c2"));
    }
}
