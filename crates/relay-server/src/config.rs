//! Server configuration: listener settings, relay protocol settings, the
//! claims service, and the registered client applications.
//!
//! Configuration is read from a TOML file (default `relay.toml`) with
//! environment variable overrides, e.g. `RELAY__SERVER__PORT=9090` or
//! `RELAY__RELAY__UPSTREAM__CLIENT_SECRET=...`.

use serde::{Deserialize, Serialize};
use url::Url;

use relay_auth::config::RelayConfig;
use relay_auth::types::ClientApplication;

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path prefix the flow endpoints are mounted under.
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_path() -> String {
    "/oauth2".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_path: default_base_path(),
        }
    }
}

/// Identity-claims service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Claims service endpoint.
    pub endpoint: Url,

    /// API key, if the service requires one.
    #[serde(default)]
    pub api_key: Option<String>,
}

/// A registered client application, as written in configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// OAuth client identifier.
    pub client_id: String,

    /// Shared secret; omit for PKCE-only public clients.
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Exact-match list of permitted callback URLs.
    pub redirect_uris: Vec<String>,

    /// Whether the client may authenticate with client_id alone.
    #[serde(default)]
    pub pkce_allowed: bool,
}

impl From<ClientConfig> for ClientApplication {
    fn from(cfg: ClientConfig) -> Self {
        Self {
            client_id: cfg.client_id,
            client_secret: cfg.client_secret,
            redirect_uris: cfg.redirect_uris,
            pkce_allowed: cfg.pkce_allowed,
        }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Relay protocol settings (upstream endpoints, callback, PKCE flag).
    pub relay: RelayConfig,

    /// Claims service settings.
    pub validator: ValidatorConfig,

    /// Registered client applications.
    #[serde(default)]
    pub clients: Vec<ClientConfig>,
}

impl AppConfig {
    /// Validates the configuration beyond what deserialization enforces.
    ///
    /// # Errors
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.relay.validate().map_err(|e| e.to_string())?;

        if !self.server.base_path.starts_with('/') {
            return Err("server.base_path must start with '/'".to_string());
        }
        if self.clients.is_empty() {
            return Err("at least one client application must be configured".to_string());
        }
        for client in &self.clients {
            if client.redirect_uris.is_empty() {
                return Err(format!(
                    "client '{}' has no redirect_uris",
                    client.client_id
                ));
            }
            if client.client_secret.is_none() && !client.pkce_allowed {
                return Err(format!(
                    "client '{}' has no secret and is not pkce_allowed; it could never authenticate",
                    client.client_id
                ));
            }
        }
        Ok(())
    }
}

pub mod loader {
    use std::path::PathBuf;

    use config::{Config, Environment, File};

    use super::AppConfig;

    /// Loads configuration from the given path (default `relay.toml`) and
    /// the `RELAY__*` environment.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or("relay.toml"));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        builder = builder.add_source(
            Environment::with_prefix("RELAY")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_toml() -> &'static str {
        r#"
            [server]
            port = 9000

            [relay]
            redirect_url = "https://relay.example.com/oauth2/redirect"
            enable_pkce_authorization_flow = true

            [relay.upstream]
            authorization_endpoint = "https://idp.example.com/authorize"
            token_endpoint = "https://idp.example.com/token"
            client_id = "relay"
            client_secret = "relay-secret"

            [validator]
            endpoint = "https://claims.example.com/validate"
            api_key = "k"

            [[clients]]
            client_id = "web-app"
            client_secret = "secret123"
            redirect_uris = ["https://app.example.com/cb"]

            [[clients]]
            client_id = "spa"
            redirect_uris = ["https://spa.example.com/cb"]
            pkce_allowed = true
        "#
    }

    #[test]
    fn test_sample_config_parses_and_validates() {
        let cfg: AppConfig = toml::from_str(sample_toml()).unwrap();
        assert_eq!(cfg.server.port, 9000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.server.base_path, "/oauth2");
        assert!(cfg.relay.enable_pkce_authorization_flow);
        assert_eq!(cfg.clients.len(), 2);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_secretless_client_must_be_pkce_allowed() {
        let mut cfg: AppConfig = toml::from_str(sample_toml()).unwrap();
        cfg.clients[1].pkce_allowed = false;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_clients_are_required() {
        let mut cfg: AppConfig = toml::from_str(sample_toml()).unwrap();
        cfg.clients.clear();
        assert!(cfg.validate().is_err());
    }
}
