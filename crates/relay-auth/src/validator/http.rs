//! HTTP-backed implementation of [`TokenValidator`].
//!
//! Posts the access token to the claims service and treats any non-2xx
//! response, or a body that does not parse as claims, as a validation
//! failure.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use crate::RelayResult;
use crate::error::RelayError;

use super::{IdentityClaims, TokenValidator};

/// Configuration for the HTTP token validator.
#[derive(Debug, Clone)]
pub struct HttpTokenValidatorConfig {
    /// The claims service endpoint.
    pub endpoint: Url,

    /// API key sent in the `apiKey` header, when the service requires one.
    pub api_key: Option<String>,

    /// HTTP request timeout (default: 10 seconds).
    pub request_timeout: Duration,
}

impl HttpTokenValidatorConfig {
    /// Creates a configuration for the given endpoint.
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            api_key: None,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ValidationRequest<'a> {
    access_token: &'a str,
}

/// Validates access tokens against a remote identity-claims service.
pub struct HttpTokenValidator {
    http_client: reqwest::Client,
    config: HttpTokenValidatorConfig,
}

impl HttpTokenValidator {
    /// Creates a new validator.
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the HTTP client cannot be built.
    pub fn new(config: HttpTokenValidatorConfig) -> RelayResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RelayError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl TokenValidator for HttpTokenValidator {
    async fn validate(&self, access_token: &str) -> RelayResult<IdentityClaims> {
        let mut request = self
            .http_client
            .post(self.config.endpoint.as_str())
            .json(&ValidationRequest { access_token });

        if let Some(api_key) = &self.config.api_key {
            request = request.header("apiKey", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RelayError::token_validation(format!("Claims service unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Access token failed validation");
            return Err(RelayError::token_validation(format!(
                "Claims service returned status {}",
                status.as_u16()
            )));
        }

        response
            .json::<IdentityClaims>()
            .await
            .map_err(|e| RelayError::token_validation(format!("Unparseable claims response: {e}")))
    }
}
