//! OAuth 2.0 protocol logic: request/response types, client
//! authentication, and token translation.

pub mod client_auth;
pub mod token;
pub mod translate;

pub use client_auth::{
    AuthenticatedClient, ClientAuthMethod, authenticate_client, parse_basic_auth,
};
pub use token::{ErrorBody, TokenRequest, TokenResponse};
pub use translate::translate;
