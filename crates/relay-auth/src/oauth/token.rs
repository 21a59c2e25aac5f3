//! Token endpoint request and response types.
//!
//! The relay promises its clients the standard RFC 6749 token response
//! shape regardless of what the upstream provider returns; the translation
//! from the upstream representation happens in
//! [`translate`](crate::oauth::translate).

use serde::{Deserialize, Serialize};

/// Token request parameters, parsed from the form-encoded POST body.
///
/// Different fields are required depending on `grant_type`:
///
/// - `authorization_code`: `code`
/// - `refresh_token`: `refresh_token`
///
/// Client credentials arrive either here (`client_id`/`client_secret`) or
/// via the HTTP Basic header, which is not part of this struct.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// OAuth 2.0 grant type. One of "authorization_code" or "refresh_token".
    #[serde(default)]
    pub grant_type: String,

    /// Authorization code (for the authorization_code grant).
    #[serde(default)]
    pub code: Option<String>,

    /// Refresh token (for the refresh_token grant).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Client ID (for client_secret_post or PKCE authentication).
    #[serde(default)]
    pub client_id: Option<String>,

    /// Client secret (for client_secret_post authentication).
    #[serde(default)]
    pub client_secret: Option<String>,
}

/// Successful token response returned to the relay's clients.
///
/// # Example Response
///
/// ```json
/// {
///   "access_token": "eyJhbG...",
///   "token_type": "Bearer",
///   "expires_in": 3600,
///   "refresh_token": "abc123...",
///   "scope": "openid profile"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The access token issued by the upstream provider.
    pub access_token: String,

    /// Token type, always "Bearer".
    pub token_type: String,

    /// Access token lifetime in seconds, relative to the moment of the
    /// response.
    pub expires_in: u64,

    /// Refresh token, passed through when the upstream issued one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token, present if and only if the upstream token set included it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Granted scopes (space-separated), copied through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Creates a new token response with required fields.
    #[must_use]
    pub fn new(access_token: String, expires_in: u64) -> Self {
        Self {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            refresh_token: None,
            id_token: None,
            scope: None,
        }
    }
}

/// JSON error body for 400/401 responses, per RFC 6749 Section 5.2.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// OAuth 2.0 error code.
    pub error: String,

    /// Human-readable error description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

impl ErrorBody {
    /// Creates a new error body with a description.
    #[must_use]
    pub fn new(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            error_description: Some(description.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_request_code_grant() {
        let body = "grant_type=authorization_code&code=SplxlOBeZQQYbYS6WxSbIA&client_id=my-app";
        let request: TokenRequest = serde_urlencoded::from_str(body).unwrap();
        assert_eq!(request.grant_type, "authorization_code");
        assert_eq!(request.code.as_deref(), Some("SplxlOBeZQQYbYS6WxSbIA"));
        assert_eq!(request.client_id.as_deref(), Some("my-app"));
        assert!(request.refresh_token.is_none());
        assert!(request.client_secret.is_none());
    }

    #[test]
    fn test_token_request_missing_grant_type_defaults_empty() {
        let request: TokenRequest = serde_urlencoded::from_str("code=abc").unwrap();
        assert!(request.grant_type.is_empty());
    }

    #[test]
    fn test_token_response_serialization_omits_absent_fields() {
        let response = TokenResponse::new("tok".to_string(), 3600);
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""token_type":"Bearer""#));
        assert!(json.contains(r#""expires_in":3600"#));
        assert!(!json.contains("refresh_token"));
        assert!(!json.contains("id_token"));
        assert!(!json.contains("scope"));
    }

    #[test]
    fn test_error_body_serialization() {
        let body = ErrorBody::new("invalid_client", "Unknown client");
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""error":"invalid_client""#));
        assert!(json.contains(r#""error_description":"Unknown client""#));
    }
}
