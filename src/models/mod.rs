//! Data models for the FinTrack offline engine
//!
//! This module organizes the domain types shared between the cache, the remote
//! gateway and the mutation engine. Wire-format DTOs live in `crate::api`.

pub mod transaction;

// Re-export commonly used types for convenience
pub use transaction::{
    NewTransaction, Transaction, TransactionId, TransactionKind, TransactionPatch,
};
