//! Core data types for the relay.

pub mod client;
pub mod transaction;

pub use client::ClientApplication;
pub use transaction::{Transaction, TransactionUpdate};
