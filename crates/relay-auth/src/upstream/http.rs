//! reqwest-backed implementation of [`UpstreamClient`].

use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::RelayResult;
use crate::config::RelayConfig;
use crate::error::RelayError;

use super::{UpstreamClient, UpstreamTokenSet};

/// Configuration for the HTTP upstream client.
#[derive(Debug, Clone)]
pub struct HttpUpstreamClientConfig {
    /// The provider's token endpoint.
    pub token_endpoint: Url,

    /// The relay's client_id at the provider.
    pub client_id: String,

    /// The relay's client_secret at the provider.
    pub client_secret: String,

    /// The relay's own callback URL, sent as `redirect_uri` on the code
    /// grant. Must match what was forwarded on the authorization request.
    pub redirect_uri: Url,

    /// HTTP request timeout (default: 30 seconds).
    pub request_timeout: Duration,
}

impl HttpUpstreamClientConfig {
    /// Builds the client configuration from the relay configuration.
    #[must_use]
    pub fn from_relay_config(config: &RelayConfig) -> Self {
        Self {
            token_endpoint: config.upstream.token_endpoint.clone(),
            client_id: config.upstream.client_id.clone(),
            client_secret: config.upstream.client_secret.clone(),
            redirect_uri: config.redirect_url.clone(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Talks to the upstream provider's token endpoint over HTTP.
///
/// Grant parameters go in an `application/x-www-form-urlencoded` body with
/// the relay's own credentials; any non-2xx response is surfaced as
/// [`RelayError::Upstream`] with the provider's status and body untouched.
pub struct HttpUpstreamClient {
    http_client: reqwest::Client,
    config: HttpUpstreamClientConfig,
}

impl HttpUpstreamClient {
    /// Creates a new upstream client.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the HTTP client cannot be built.
    pub fn new(config: HttpUpstreamClientConfig) -> RelayResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RelayError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    async fn post_grant(&self, params: &[(&str, &str)]) -> RelayResult<UpstreamTokenSet> {
        tracing::debug!(
            endpoint = %self.config.token_endpoint,
            grant_type = params.first().map(|(_, v)| *v).unwrap_or(""),
            "Calling upstream token endpoint"
        );

        let response = self
            .http_client
            .post(self.config.token_endpoint.as_str())
            .form(params)
            .send()
            .await
            .map_err(|e| RelayError::upstream(502, format!("Upstream unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Upstream rejected the grant");
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                content_type,
                body,
            });
        }

        response
            .json::<UpstreamTokenSet>()
            .await
            .map_err(|e| RelayError::internal(format!("Failed to parse upstream token set: {e}")))
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstreamClient {
    async fn exchange_code(&self, code: &str) -> RelayResult<UpstreamTokenSet> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        self.post_grant(&params).await
    }

    async fn refresh(&self, refresh_token: &str) -> RelayResult<UpstreamTokenSet> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];
        self.post_grant(&params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> HttpUpstreamClient {
        let config = HttpUpstreamClientConfig {
            token_endpoint: Url::parse(&format!("{}/token", server.uri())).unwrap(),
            client_id: "relay".to_string(),
            client_secret: "relay-secret".to_string(),
            redirect_uri: Url::parse("https://relay.example.com/oauth2/redirect").unwrap(),
            request_timeout: Duration::from_secs(5),
        };
        HttpUpstreamClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_exchange_code_sends_grant_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code-1"))
            .and(body_string_contains("client_id=relay"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "rt",
                "id_token": "idt"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token_set = client_for(&server).exchange_code("auth-code-1").await.unwrap();
        assert_eq!(token_set.access_token, "at");
        assert_eq!(token_set.expires_in, Some(3600));
        assert_eq!(token_set.refresh_token.as_deref(), Some("rt"));
    }

    #[tokio::test]
    async fn test_refresh_sends_grant_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=rt-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at2",
                "expires_in": 600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token_set = client_for(&server).refresh("rt-1").await.unwrap();
        assert_eq!(token_set.access_token, "at2");
    }

    #[tokio::test]
    async fn test_rejection_carries_status_and_body_verbatim() {
        let server = MockServer::start().await;
        let error_body = r#"{"error":"invalid_grant","error_description":"expired"}"#;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_raw(error_body, "application/json"),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).exchange_code("stale").await;
        match result {
            Err(RelayError::Upstream {
                status,
                content_type,
                body,
            }) => {
                assert_eq!(status, 400);
                assert_eq!(content_type.as_deref(), Some("application/json"));
                assert_eq!(body, error_body);
            }
            other => panic!("expected Upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unparseable_success_body_is_internal_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = client_for(&server).refresh("rt").await;
        assert!(matches!(result, Err(RelayError::Internal { .. })));
    }
}
