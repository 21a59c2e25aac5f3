//! Registered client application records.
//!
//! The relay does not own client registrations; it reads them through the
//! [`ClientRegistry`](crate::store::ClientRegistry) lookup. The record
//! carries everything the authenticator and the authorize handler need:
//! the optional shared secret, the registered redirect URIs, and whether
//! the application may authenticate without a secret (PKCE mode).

use serde::{Deserialize, Serialize};

/// A registered client application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientApplication {
    /// The OAuth client identifier.
    pub client_id: String,

    /// Shared secret; absent for public (PKCE-only) clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Callback URLs the application registered. An authorization request
    /// must exact-match one of these.
    pub redirect_uris: Vec<String>,

    /// Whether this application may authenticate with `client_id` alone.
    #[serde(default)]
    pub pkce_allowed: bool,
}

impl ClientApplication {
    /// Creates a confidential client with a shared secret.
    #[must_use]
    pub fn confidential(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uris: Vec<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: Some(client_secret.into()),
            redirect_uris,
            pkce_allowed: false,
        }
    }

    /// Creates a public client with no secret, eligible for PKCE
    /// authentication.
    #[must_use]
    pub fn public(client_id: impl Into<String>, redirect_uris: Vec<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uris,
            pkce_allowed: true,
        }
    }

    /// Returns `true` if `uri` exactly matches a registered redirect URI.
    #[must_use]
    pub fn is_redirect_uri_registered(&self, uri: &str) -> bool {
        self.redirect_uris.iter().any(|r| r == uri)
    }
}
