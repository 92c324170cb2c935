//! Remote transaction gateway
//!
//! `TransactionService` is the abstract contract the engine consumes;
//! `HttpTransactionService` is the production implementation over the
//! FinTrack server API.

pub mod client;
pub mod models;

pub use client::{HttpTransactionService, TransactionService};
pub use models::ApiError;
