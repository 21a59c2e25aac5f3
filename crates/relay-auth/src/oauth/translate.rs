//! Translation of the upstream token representation into the response
//! shape the relay promises its clients.
//!
//! This is a pure, synchronous transformation: no I/O, and the same input
//! with the same clock always produces the same output. Callers pass `now`
//! explicitly so the absolute-to-relative expiry conversion is exact and
//! testable against a frozen clock.

use time::OffsetDateTime;

use crate::RelayResult;
use crate::error::RelayError;
use crate::upstream::UpstreamTokenSet;

use super::token::TokenResponse;

/// Normalizes an upstream token set into a [`TokenResponse`].
///
/// `expires_in` is the upstream-declared relative duration when present;
/// otherwise it is computed as `expires_at − now` in whole seconds,
/// clamped at zero for tokens that are already expired. `id_token`,
/// `refresh_token`, and `scope` are copied through only when the upstream
/// supplied them, so their keys are omitted rather than serialized as
/// null.
///
/// # Errors
///
/// Returns `Internal` if the upstream supplied neither `expires_in` nor
/// `expires_at`.
pub fn translate(token_set: &UpstreamTokenSet, now: OffsetDateTime) -> RelayResult<TokenResponse> {
    let expires_in = match (token_set.expires_in, token_set.expires_at) {
        (Some(relative), _) => relative,
        (None, Some(absolute)) => absolute.saturating_sub(now.unix_timestamp()).max(0) as u64,
        (None, None) => {
            return Err(RelayError::internal(
                "Upstream token set carries no expiry information",
            ));
        }
    };

    Ok(TokenResponse {
        access_token: token_set.access_token.clone(),
        token_type: "Bearer".to_string(),
        expires_in,
        refresh_token: token_set.refresh_token.clone(),
        id_token: token_set.id_token.clone(),
        scope: token_set.scope.clone(),
    })
}
