//! Storage traits for transaction state and client registrations.
//!
//! The relay consumes these contracts; implementations live in separate
//! crates (`relay-store-memory` ships the default in-process backend).
//!
//! # Concurrency
//!
//! The relay takes no in-process locks around transaction records.
//! Concurrent requests referencing the same state, code, or refresh token
//! race at the store level; implementations are expected to provide
//! single-use semantics for code redemption via [`TransactionStore::consume_code`]
//! so the second redemption of a code fails with `NotFound`.

use async_trait::async_trait;

use crate::RelayResult;
use crate::types::{ClientApplication, Transaction, TransactionUpdate};

/// Persistence operations for transaction records, keyed by `state` with
/// secondary lookups by `code` and `refresh_token`.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Creates a new transaction record.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if a transaction with the same `state` already
    /// exists, or `Storage` if the backend fails.
    async fn create(&self, txn: Transaction) -> RelayResult<Transaction>;

    /// Looks up a transaction by its `state`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no transaction has this state.
    async fn get_by_state(&self, state: &str) -> RelayResult<Transaction>;

    /// Looks up a transaction by its authorization `code`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no transaction carries this code.
    async fn get_by_code(&self, code: &str) -> RelayResult<Transaction>;

    /// Looks up a transaction by its `refresh_token`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no transaction carries this refresh token.
    async fn get_by_refresh_token(&self, token: &str) -> RelayResult<Transaction>;

    /// Applies a partial update to the transaction with the given `state`
    /// and returns the full updated record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the state no longer exists.
    async fn update(&self, state: &str, update: TransactionUpdate) -> RelayResult<Transaction>;

    /// Atomically redeems an authorization code: looks the transaction up
    /// by `code`, clears the code from the record, and returns the record
    /// as it was before the code was cleared.
    ///
    /// A second call with the same code must fail, which is what makes
    /// codes single-use.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the code is unknown or already redeemed.
    async fn consume_code(&self, code: &str) -> RelayResult<Transaction>;
}

/// Read-only lookup of registered client applications.
///
/// Registration management is out of scope for the relay; this trait is
/// the contract it requires of whatever system owns the registrations.
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// Finds a client application by its OAuth client_id.
    ///
    /// Returns `None` if the application is not registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn find_by_client_id(&self, client_id: &str) -> RelayResult<Option<ClientApplication>>;
}
