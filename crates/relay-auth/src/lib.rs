//! OAuth 2.0 / OIDC relay core.
//!
//! The relay sits between client applications and a legacy upstream
//! identity provider. Clients speak standard OAuth 2.0 to the relay; the
//! relay holds its own single registration with the upstream and
//! correlates each client flow with the upstream flow through a persisted
//! transaction record keyed by `state`.
//!
//! This crate contains the protocol core: the transaction and client
//! types, the storage contracts, client authentication, token
//! translation, the upstream and validator collaborators, and the axum
//! handlers for the three flow endpoints. Storage backends and the server
//! binary live in sibling crates.

pub mod config;
pub mod error;
pub mod http;
pub mod oauth;
pub mod store;
pub mod types;
pub mod upstream;
pub mod validator;

pub use config::{RelayConfig, UpstreamConfig};
pub use error::RelayError;
pub use http::{RelayState, router};
pub use store::{ClientRegistry, TransactionStore};
pub use types::{ClientApplication, Transaction, TransactionUpdate};

/// Result alias used throughout the relay.
pub type RelayResult<T> = Result<T, RelayError>;
