//! In-memory storage backends for the OIDC relay.
//!
//! [`MemoryTransactionStore`] keeps transaction records in a single
//! `RwLock`-guarded table with secondary indexes by code and refresh
//! token; holding all three maps behind one lock is what makes
//! `consume_code` an atomic redemption. Suitable for a single-process
//! deployment and for tests; records live until the process exits.
//!
//! [`MemoryClientRegistry`] is a fixed set of client applications loaded
//! at startup.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use relay_auth::error::RelayError;
use relay_auth::store::{ClientRegistry, TransactionStore};
use relay_auth::types::{ClientApplication, Transaction, TransactionUpdate};
use relay_auth::RelayResult;

/// Transaction table plus secondary indexes, guarded as one unit.
#[derive(Default)]
struct Tables {
    /// state -> record
    by_state: HashMap<String, Transaction>,
    /// code -> state
    by_code: HashMap<String, String>,
    /// refresh_token -> state
    by_refresh_token: HashMap<String, String>,
}

/// In-memory [`TransactionStore`] backend.
#[derive(Default)]
pub struct MemoryTransactionStore {
    tables: RwLock<Tables>,
}

impl MemoryTransactionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn create(&self, txn: Transaction) -> RelayResult<Transaction> {
        let mut tables = self.tables.write().await;
        if tables.by_state.contains_key(&txn.state) {
            return Err(RelayError::conflict(format!(
                "Transaction with state '{}' already exists",
                txn.state
            )));
        }
        tables.by_state.insert(txn.state.clone(), txn.clone());
        tracing::debug!(client_id = %txn.client_id, "Transaction created");
        Ok(txn)
    }

    async fn get_by_state(&self, state: &str) -> RelayResult<Transaction> {
        self.tables
            .read()
            .await
            .by_state
            .get(state)
            .cloned()
            .ok_or_else(|| RelayError::not_found("No transaction for state"))
    }

    async fn get_by_code(&self, code: &str) -> RelayResult<Transaction> {
        let tables = self.tables.read().await;
        tables
            .by_code
            .get(code)
            .and_then(|state| tables.by_state.get(state))
            .cloned()
            .ok_or_else(|| RelayError::not_found("No transaction for code"))
    }

    async fn get_by_refresh_token(&self, token: &str) -> RelayResult<Transaction> {
        let tables = self.tables.read().await;
        tables
            .by_refresh_token
            .get(token)
            .and_then(|state| tables.by_state.get(state))
            .cloned()
            .ok_or_else(|| RelayError::not_found("No transaction for refresh token"))
    }

    async fn update(&self, state: &str, update: TransactionUpdate) -> RelayResult<Transaction> {
        let mut tables = self.tables.write().await;

        let mut record = tables
            .by_state
            .get(state)
            .cloned()
            .ok_or_else(|| RelayError::not_found("No transaction for state"))?;

        if let Some(code) = update.code {
            if let Some(previous) = record.code.take() {
                tables.by_code.remove(&previous);
            }
            tables.by_code.insert(code.clone(), state.to_string());
            record.code = Some(code);
        }
        if let Some(token) = update.refresh_token {
            if let Some(previous) = record.refresh_token.take() {
                tables.by_refresh_token.remove(&previous);
            }
            tables
                .by_refresh_token
                .insert(token.clone(), state.to_string());
            record.refresh_token = Some(token);
        }
        record.updated_at = OffsetDateTime::now_utc();

        tables.by_state.insert(state.to_string(), record.clone());
        Ok(record)
    }

    async fn consume_code(&self, code: &str) -> RelayResult<Transaction> {
        let mut tables = self.tables.write().await;

        // Removing the index entry under the write lock is what makes a
        // concurrent second redemption fail.
        let state = tables
            .by_code
            .remove(code)
            .ok_or_else(|| RelayError::not_found("No transaction for code"))?;

        let record = tables
            .by_state
            .get_mut(&state)
            .ok_or_else(|| RelayError::storage("Code index points at a missing transaction"))?;

        let snapshot = record.clone();
        record.code = None;
        record.updated_at = OffsetDateTime::now_utc();
        Ok(snapshot)
    }
}

/// Fixed in-memory [`ClientRegistry`] loaded from configuration.
pub struct MemoryClientRegistry {
    applications: HashMap<String, ClientApplication>,
}

impl MemoryClientRegistry {
    /// Builds a registry from a list of applications.
    #[must_use]
    pub fn new(applications: Vec<ClientApplication>) -> Self {
        Self {
            applications: applications
                .into_iter()
                .map(|app| (app.client_id.clone(), app))
                .collect(),
        }
    }

    /// Number of registered applications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.applications.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}

#[async_trait]
impl ClientRegistry for MemoryClientRegistry {
    async fn find_by_client_id(&self, client_id: &str) -> RelayResult<Option<ClientApplication>> {
        Ok(self.applications.get(client_id).cloned())
    }
}
