//! Client authentication for the token endpoint.
//!
//! Three methods are supported, tried strictly in this order:
//!
//! 1. HTTP Basic Auth header (`client_id:client_secret`)
//! 2. `client_id` and `client_secret` in the request body
//! 3. PKCE mode: `client_id` alone, accepted only when the application is
//!    flagged `pkce_allowed` AND the deployment enables
//!    `enable_pkce_authorization_flow`
//!
//! The chain is an ordered strategy list: the first method whose
//! credentials are present decides the outcome. There is no fallthrough
//! from a failed secret check to PKCE, and an unmatched case always
//! rejects rather than default-allowing.

use std::fmt;

use crate::RelayResult;
use crate::error::RelayError;
use crate::store::ClientRegistry;
use crate::types::ClientApplication;

use super::token::TokenRequest;

/// Result of successful client authentication.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    /// The resolved client application record.
    pub application: ClientApplication,

    /// The method that authenticated the client.
    pub method: ClientAuthMethod,
}

/// How a client authenticated at the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuthMethod {
    /// Shared secret via the HTTP Basic header.
    Basic,

    /// Shared secret in the request body.
    Post,

    /// No secret; client_id only (public/PKCE clients).
    Pkce,
}

impl ClientAuthMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "client_secret_basic",
            Self::Post => "client_secret_post",
            Self::Pkce => "none",
        }
    }
}

impl fmt::Display for ClientAuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticates the calling client from a token request.
///
/// # Arguments
///
/// * `request` - The parsed token request body
/// * `basic_auth` - Credentials from the HTTP Basic header, if present
/// * `registry` - Lookup for registered client applications
/// * `pkce_flow_enabled` - The deployment's `enable_pkce_authorization_flow` flag
///
/// # Errors
///
/// Returns `Unauthorized` if no credential method matches, the client is
/// unknown, or the presented secret is wrong. Lookup failures are not
/// distinguished from wrong credentials.
pub async fn authenticate_client(
    request: &TokenRequest,
    basic_auth: Option<(&str, &str)>,
    registry: &dyn ClientRegistry,
    pkce_flow_enabled: bool,
) -> RelayResult<AuthenticatedClient> {
    if let Some((client_id, client_secret)) = basic_auth {
        return check_secret(client_id, client_secret, registry, ClientAuthMethod::Basic).await;
    }

    if let (Some(client_id), Some(client_secret)) = (&request.client_id, &request.client_secret) {
        return check_secret(client_id, client_secret, registry, ClientAuthMethod::Post).await;
    }

    if let Some(client_id) = &request.client_id {
        return authenticate_pkce(client_id, registry, pkce_flow_enabled).await;
    }

    Err(RelayError::unauthorized("No client credentials provided"))
}

/// Looks up the application and requires an exact secret match.
async fn check_secret(
    client_id: &str,
    client_secret: &str,
    registry: &dyn ClientRegistry,
    method: ClientAuthMethod,
) -> RelayResult<AuthenticatedClient> {
    let application = lookup(client_id, registry).await?;

    match application.client_secret.as_deref() {
        Some(registered) if registered == client_secret => Ok(AuthenticatedClient {
            application,
            method,
        }),
        _ => Err(RelayError::unauthorized("Invalid client credentials")),
    }
}

/// Accepts a client_id with no secret check when both the application and
/// the deployment permit it.
async fn authenticate_pkce(
    client_id: &str,
    registry: &dyn ClientRegistry,
    pkce_flow_enabled: bool,
) -> RelayResult<AuthenticatedClient> {
    let application = lookup(client_id, registry).await?;

    if !application.pkce_allowed {
        return Err(RelayError::unauthorized(
            "Client requires a secret to authenticate",
        ));
    }
    if !pkce_flow_enabled {
        return Err(RelayError::unauthorized(
            "PKCE authentication is not enabled",
        ));
    }

    Ok(AuthenticatedClient {
        application,
        method: ClientAuthMethod::Pkce,
    })
}

async fn lookup(client_id: &str, registry: &dyn ClientRegistry) -> RelayResult<ClientApplication> {
    registry
        .find_by_client_id(client_id)
        .await?
        .ok_or_else(|| RelayError::unauthorized("Invalid client credentials"))
}

/// Parses an HTTP Basic Auth header value into `(client_id, client_secret)`.
///
/// Returns `None` for any malformed value: wrong scheme, bad base64, or a
/// payload without a colon separator. Secrets may themselves contain
/// colons; the split happens at the first one.
#[must_use]
pub fn parse_basic_auth(header_value: &str) -> Option<(String, String)> {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    let encoded = header_value.trim().strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let credentials = String::from_utf8(decoded).ok()?;
    let (client_id, client_secret) = credentials.split_once(':')?;

    Some((client_id.to_string(), client_secret.to_string()))
}
