//! Error types for relay operations.
//!
//! The taxonomy maps directly onto the HTTP surface: validation failures
//! become 400, authentication failures 401, upstream rejections are passed
//! through with their original status and body, and everything else is a
//! generic 500. Where a `NotFound` maps to depends on the endpoint: the
//! authorize/redirect paths treat it as a malformed request (400, no
//! existence leakage), the token path treats it as credential-equivalent
//! (401).

/// Errors that can occur while driving a relay transaction.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// A required field is missing or malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what is wrong with the request.
        message: String,
    },

    /// No client credential matched, or the matched credential is wrong.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Description of why the request is unauthorized.
        message: String,
    },

    /// A transaction lookup by state, code, or refresh token found nothing.
    #[error("Not found: {message}")]
    NotFound {
        /// Description of what was looked up.
        message: String,
    },

    /// A transaction with the same state already exists.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting write.
        message: String,
    },

    /// The upstream provider rejected a grant. Status, content type, and
    /// body are carried verbatim so the handler can pass them through
    /// unchanged.
    #[error("Upstream rejected the request with status {status}")]
    Upstream {
        /// The upstream HTTP status code.
        status: u16,
        /// The upstream `Content-Type` header, when it sent one.
        content_type: Option<String>,
        /// The upstream response body, unmodified.
        body: String,
    },

    /// The issued access token failed validation at the claims service.
    #[error("Token validation failed: {message}")]
    TokenValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// An error occurred while reading or writing transaction state.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// The relay configuration is invalid.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl RelayError {
    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Unauthorized` error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new `Upstream` error carrying the provider's response.
    #[must_use]
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// Creates a new `TokenValidation` error.
    #[must_use]
    pub fn token_validation(message: impl Into<String>) -> Self {
        Self::TokenValidation {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is attributable to the caller.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest { .. }
                | Self::Unauthorized { .. }
                | Self::NotFound { .. }
                | Self::Conflict { .. }
        )
    }

    /// Returns `true` if this error originated in a collaborator rather
    /// than in the relay itself.
    #[must_use]
    pub fn is_collaborator_error(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. } | Self::TokenValidation { .. } | Self::Storage { .. }
        )
    }

    /// Returns the RFC 6749 error code used in JSON error bodies.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } | Self::Conflict { .. } => "invalid_request",
            Self::Unauthorized { .. } | Self::NotFound { .. } => "invalid_client",
            Self::TokenValidation { .. } => "invalid_token",
            Self::Upstream { .. }
            | Self::Storage { .. }
            | Self::Configuration { .. }
            | Self::Internal { .. } => "server_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RelayError::invalid_request("state is required");
        assert_eq!(err.to_string(), "Invalid request: state is required");

        let err = RelayError::not_found("no transaction for code");
        assert_eq!(err.to_string(), "Not found: no transaction for code");

        let err = RelayError::upstream(400, r#"{"error":"invalid_grant"}"#);
        assert_eq!(
            err.to_string(),
            "Upstream rejected the request with status 400"
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(RelayError::invalid_request("x").is_client_error());
        assert!(RelayError::unauthorized("x").is_client_error());
        assert!(!RelayError::storage("x").is_client_error());

        assert!(RelayError::upstream(502, "").is_collaborator_error());
        assert!(RelayError::token_validation("x").is_collaborator_error());
        assert!(!RelayError::invalid_request("x").is_collaborator_error());
    }

    #[test]
    fn test_oauth_error_code() {
        assert_eq!(
            RelayError::invalid_request("x").oauth_error_code(),
            "invalid_request"
        );
        assert_eq!(
            RelayError::unauthorized("x").oauth_error_code(),
            "invalid_client"
        );
        assert_eq!(
            RelayError::not_found("x").oauth_error_code(),
            "invalid_client"
        );
        assert_eq!(
            RelayError::token_validation("x").oauth_error_code(),
            "invalid_token"
        );
        assert_eq!(RelayError::internal("x").oauth_error_code(), "server_error");
    }
}
