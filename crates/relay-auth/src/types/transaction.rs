//! The transaction record: the only entity the relay persists.
//!
//! A transaction correlates a client's authorization attempt (keyed by the
//! opaque `state` value) with the authorization code and refresh token the
//! upstream provider eventually issues for it.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single in-flight (or completed) authorization transaction.
///
/// `state` is the primary key and is immutable for the lifetime of the
/// record. `redirect_uri` is validated against the client application's
/// registered URIs before the record is created and never changes
/// afterwards; this is what prevents open-redirect abuse on the callback
/// path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque client-visible state value; unique per in-flight transaction.
    pub state: String,

    /// Identifier of the requesting client application.
    pub client_id: String,

    /// The client's callback URL, exact-matched against the application's
    /// registered list at creation time.
    pub redirect_uri: String,

    /// Upstream-issued authorization code. Absent until the redirect
    /// handler populates it; single-use.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Upstream-issued refresh token. Absent on a first-time flow,
    /// overwritten on each successful refresh grant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the record was last written.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Creates a new transaction with both timestamps set to now.
    #[must_use]
    pub fn new(
        state: impl Into<String>,
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            state: state.into(),
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            code: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update applied to a stored transaction.
///
/// Only the fields that are `Some` are written; `state`, `client_id`, and
/// `redirect_uri` cannot be changed through an update.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    /// New authorization code value.
    pub code: Option<String>,

    /// New refresh token value (rotation).
    pub refresh_token: Option<String>,
}

impl TransactionUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the authorization code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the refresh token.
    #[must_use]
    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }
}
