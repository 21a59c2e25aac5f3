//! POST /token: code redemption and refresh grants.
//!
//! Request validation and client authentication complete before any
//! collaborator is contacted: a request that is going to fail must fail
//! without burning an upstream call or a validator call. Grant-type
//! dispatch happens first, then the grant credential (code or refresh
//! token) is resolved against the store, then the client authenticates,
//! and only then does the relay talk to the upstream and the claims
//! service.

use axum::Form;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use time::OffsetDateTime;

use crate::RelayResult;
use crate::error::RelayError;
use crate::oauth::token::{ErrorBody, TokenRequest};
use crate::oauth::{AuthenticatedClient, authenticate_client, parse_basic_auth, translate};
use crate::types::{Transaction, TransactionUpdate};

use super::RelayState;

/// Handles POST /token.
pub async fn token_handler(
    State(relay): State<RelayState>,
    headers: HeaderMap,
    Form(request): Form<TokenRequest>,
) -> Response {
    let result = match request.grant_type.as_str() {
        "authorization_code" => authorization_code_grant(&relay, &headers, &request).await,
        "refresh_token" => refresh_token_grant(&relay, &headers, &request).await,
        other => {
            tracing::warn!(grant_type = %other, "Unsupported grant type");
            return error_response(
                StatusCode::UNAUTHORIZED,
                "unsupported_grant_type",
                "grant_type must be authorization_code or refresh_token",
            );
        }
    };

    match result {
        Ok(response) => response,
        Err(err) => token_error_response(err),
    }
}

/// Redeems an authorization code for tokens.
async fn authorization_code_grant(
    relay: &RelayState,
    headers: &HeaderMap,
    request: &TokenRequest,
) -> RelayResult<Response> {
    let code = request
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| RelayError::unauthorized("code is required"))?;

    let txn = relay.store.get_by_code(code).await?;
    let client = authenticate(relay, headers, request).await?;
    require_transaction_owner(&txn, &client)?;

    // Atomic redemption happens only after the client has proven itself,
    // so a failed authentication does not burn the code. A concurrent
    // second redemption loses the race here and fails as NotFound.
    let txn = relay.store.consume_code(code).await?;

    let token_set = relay.upstream.exchange_code(code).await?;
    let claims = relay.validator.validate(&token_set.access_token).await?;

    if let Some(refresh_token) = &token_set.refresh_token {
        relay
            .store
            .update(
                &txn.state,
                TransactionUpdate::new().with_refresh_token(refresh_token),
            )
            .await?;
    }

    let response = translate(&token_set, OffsetDateTime::now_utc())?;
    tracing::info!(
        client_id = %client.application.client_id,
        auth_method = %client.method,
        sub = %claims.sub,
        "Authorization code redeemed"
    );
    Ok(success_response(&response))
}

/// Exchanges a refresh token for a fresh token set, rotating the stored
/// refresh token when the upstream issues a new one.
async fn refresh_token_grant(
    relay: &RelayState,
    headers: &HeaderMap,
    request: &TokenRequest,
) -> RelayResult<Response> {
    let refresh_token = request
        .refresh_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| RelayError::unauthorized("refresh_token is required"))?;

    let txn = relay.store.get_by_refresh_token(refresh_token).await?;
    let client = authenticate(relay, headers, request).await?;
    require_transaction_owner(&txn, &client)?;

    let token_set = relay.upstream.refresh(refresh_token).await?;
    let claims = relay.validator.validate(&token_set.access_token).await?;

    if let Some(rotated) = &token_set.refresh_token {
        relay
            .store
            .update(
                &txn.state,
                TransactionUpdate::new().with_refresh_token(rotated),
            )
            .await?;
    }

    let response = translate(&token_set, OffsetDateTime::now_utc())?;
    tracing::info!(
        client_id = %client.application.client_id,
        auth_method = %client.method,
        sub = %claims.sub,
        "Refresh grant completed"
    );
    Ok(success_response(&response))
}

async fn authenticate(
    relay: &RelayState,
    headers: &HeaderMap,
    request: &TokenRequest,
) -> RelayResult<AuthenticatedClient> {
    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_auth);

    authenticate_client(
        request,
        basic.as_ref().map(|(id, secret)| (id.as_str(), secret.as_str())),
        relay.registry.as_ref(),
        relay.config.enable_pkce_authorization_flow,
    )
    .await
}

/// The grant credential must belong to the authenticated client; a valid
/// client must not be able to redeem another client's transaction.
fn require_transaction_owner(txn: &Transaction, client: &AuthenticatedClient) -> RelayResult<()> {
    if txn.client_id != client.application.client_id {
        tracing::warn!(
            client_id = %client.application.client_id,
            "Client presented a grant credential owned by another client"
        );
        return Err(RelayError::unauthorized("Invalid client credentials"));
    }
    Ok(())
}

fn success_response(response: &crate::oauth::TokenResponse) -> Response {
    (
        StatusCode::OK,
        [
            (header::CACHE_CONTROL, "no-store"),
            (header::PRAGMA, "no-cache"),
        ],
        axum::Json(response),
    )
        .into_response()
}

/// Maps a flow error onto the token endpoint's response contract.
///
/// Anything credential-equivalent (including unknown codes and refresh
/// tokens) is 401, upstream rejections are replayed verbatim, and the
/// remainder is 500.
fn token_error_response(err: RelayError) -> Response {
    match err {
        RelayError::Upstream {
            status,
            content_type,
            body,
        } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            // The content type is replayed along with the body; when the
            // upstream sent none, none is fabricated here either.
            match content_type {
                Some(content_type) => {
                    (status, [(header::CONTENT_TYPE, content_type)], body).into_response()
                }
                None => (status, axum::body::Body::from(body)).into_response(),
            }
        }
        RelayError::Unauthorized { message } | RelayError::NotFound { message } => {
            error_response(StatusCode::UNAUTHORIZED, "invalid_client", &message)
        }
        RelayError::TokenValidation { message } => {
            error_response(StatusCode::UNAUTHORIZED, "invalid_token", &message)
        }
        RelayError::InvalidRequest { message } => {
            error_response(StatusCode::BAD_REQUEST, "invalid_request", &message)
        }
        err => {
            tracing::error!(error = %err, "Token grant failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "server_error",
                "Token grant failed",
            )
        }
    }
}

fn error_response(status: StatusCode, error: &str, description: &str) -> Response {
    (status, axum::Json(ErrorBody::new(error, description))).into_response()
}
