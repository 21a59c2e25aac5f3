//! Token validation collaborator contract.
//!
//! After an upstream grant succeeds, the issued access token is checked
//! against a separate identity-claims service before the relay answers the
//! client. The relay only defines the contract: token string in, verified
//! claims out, failure for anything invalid, expired, or unparseable. The
//! HTTP-backed implementation lives in [`http`].

pub mod http;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::RelayResult;

pub use http::{HttpTokenValidator, HttpTokenValidatorConfig};

/// Verified identity claims returned by the validation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject identifier.
    pub sub: String,

    /// Expiration time (Unix timestamp), when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// User's email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// User's full name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Any further claims the service supplies.
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

/// Converts an opaque access token into verified identity claims.
///
/// A failure here means the token the upstream just issued is not usable;
/// the token handler maps it to 401 and does not retry.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    /// Validates an access token.
    ///
    /// # Errors
    ///
    /// Returns `TokenValidation` if the token is invalid, expired, or the
    /// claims cannot be parsed.
    async fn validate(&self, access_token: &str) -> RelayResult<IdentityClaims>;
}
