//! Upstream OIDC provider client.
//!
//! The relay never talks to the provider's token endpoint directly from a
//! handler; it goes through the [`UpstreamClient`] trait so tests can
//! substitute a mock and so provider quirks stay in one place. The
//! reqwest-backed implementation lives in [`http`].

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::RelayResult;

pub use http::{HttpUpstreamClient, HttpUpstreamClientConfig};

/// Token set returned by the upstream provider's token endpoint.
///
/// Providers disagree on how they express expiry: some send the standard
/// relative `expires_in`, some only an absolute `expires_at` epoch
/// timestamp. Both are modeled; translation normalizes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpstreamTokenSet {
    /// The issued access token.
    pub access_token: String,

    /// Token type as reported upstream, usually "Bearer".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Relative lifetime in seconds, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Absolute expiry as epoch seconds, when the provider supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,

    /// Refresh token, if issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token, if issued.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Granted scopes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Client for the upstream provider's token endpoint.
///
/// Implementations surface provider rejections as
/// [`RelayError::Upstream`](crate::RelayError::Upstream) with the original
/// status and body intact, so handlers can pass them through verbatim.
/// No retries: a failed call is reported immediately.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Exchanges an authorization code for a token set
    /// (`grant_type=authorization_code`).
    ///
    /// # Errors
    ///
    /// Returns `Upstream` when the provider rejects the grant, or
    /// `Internal` when the response cannot be parsed.
    async fn exchange_code(&self, code: &str) -> RelayResult<UpstreamTokenSet>;

    /// Exchanges a refresh token for a new token set
    /// (`grant_type=refresh_token`).
    ///
    /// # Errors
    ///
    /// Same failure modes as [`exchange_code`](Self::exchange_code).
    async fn refresh(&self, refresh_token: &str) -> RelayResult<UpstreamTokenSet>;
}
