//! Relay protocol configuration.
//!
//! Configuration is loaded once at startup and passed into handler state
//! as an immutable struct; handlers never consult globals.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::RelayError;

/// Upstream identity provider endpoints and the relay's own credentials
/// with that provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// The provider's authorization endpoint, where end-users are sent.
    pub authorization_endpoint: Url,

    /// The provider's token endpoint, used for code and refresh grants.
    pub token_endpoint: Url,

    /// The client_id the relay is registered under at the provider.
    pub client_id: String,

    /// The relay's shared secret with the provider.
    pub client_secret: String,

    /// Scope forwarded on authorization requests.
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_scope() -> String {
    "openid profile offline_access".to_string()
}

/// Configuration the relay core needs to drive the flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Upstream provider endpoints and credentials.
    pub upstream: UpstreamConfig,

    /// The relay's own callback URL, registered with the upstream provider.
    /// This is the redirect target forwarded on authorization requests, not
    /// the client's callback.
    pub redirect_url: Url,

    /// Whether public clients may authenticate with `client_id` alone.
    /// When false, PKCE-eligible applications are still rejected at the
    /// token endpoint unless they present a secret.
    #[serde(default)]
    pub enable_pkce_authorization_flow: bool,
}

impl RelayConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error describing the first problem found.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.upstream.client_id.is_empty() {
            return Err(RelayError::configuration("upstream.client_id is required"));
        }
        if self.upstream.client_secret.is_empty() {
            return Err(RelayError::configuration(
                "upstream.client_secret is required",
            ));
        }
        if self.upstream.scope.trim().is_empty() {
            return Err(RelayError::configuration("upstream.scope must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> RelayConfig {
        RelayConfig {
            upstream: UpstreamConfig {
                authorization_endpoint: Url::parse("https://idp.example.com/authorize").unwrap(),
                token_endpoint: Url::parse("https://idp.example.com/token").unwrap(),
                client_id: "relay".to_string(),
                client_secret: "relay-secret".to_string(),
                scope: default_scope(),
            },
            redirect_url: Url::parse("https://relay.example.com/oauth2/redirect").unwrap(),
            enable_pkce_authorization_flow: false,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_missing_upstream_credentials() {
        let mut cfg = test_config();
        cfg.upstream.client_id.clear();
        assert!(matches!(
            cfg.validate(),
            Err(RelayError::Configuration { .. })
        ));

        let mut cfg = test_config();
        cfg.upstream.client_secret.clear();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let toml = r#"
            redirect_url = "https://relay.example.com/oauth2/redirect"

            [upstream]
            authorization_endpoint = "https://idp.example.com/authorize"
            token_endpoint = "https://idp.example.com/token"
            client_id = "relay"
            client_secret = "s"
        "#;
        let cfg: RelayConfig = toml::from_str(toml).unwrap();
        assert!(!cfg.enable_pkce_authorization_flow);
        assert_eq!(cfg.upstream.scope, "openid profile offline_access");
    }
}
