use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{NewTransaction, Transaction, TransactionId, TransactionKind, TransactionPatch};

/// Transaction as it appears on the wire; ids here are always server-assigned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTransaction {
    pub id: String,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ApiTransaction {
    pub fn into_domain(self) -> Transaction {
        Transaction {
            id: TransactionId::Confirmed(self.id),
            description: self.description,
            amount: self.amount,
            kind: self.kind,
            date: self.date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Request body for POST /transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
}

impl From<&NewTransaction> for CreateTransactionRequest {
    fn from(new: &NewTransaction) -> Self {
        Self {
            description: new.description.clone(),
            amount: new.amount,
            kind: new.kind,
            date: new.date,
        }
    }
}

/// Request body for PATCH /transactions/{id}; only changed fields are sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
}

impl From<&TransactionPatch> for UpdateTransactionRequest {
    fn from(patch: &TransactionPatch) -> Self {
        Self {
            description: patch.description.clone(),
            amount: patch.amount,
            kind: patch.kind,
            date: patch.date,
        }
    }
}

/// Error response body from the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
    pub status: Option<i32>,
}

/// 429 rate limit response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResponse {
    pub message: String,
    pub retry_after: Option<i64>,
    pub global: Option<bool>,
}

/// Comprehensive error type for gateway operations
///
/// The engine treats every variant uniformly as "the call failed"; the
/// variants exist for logging and for hosts that want to inspect failures.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Bad Request: {0}")]
    BadRequest(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Rate Limited (global: {is_global}). Retry after {retry_after} ms")]
    RateLimited { retry_after: i64, is_global: bool },
    #[error("Server Error ({0}): {1}")]
    ServerError(i32, String),
    #[error("HTTP Error ({0}): {1}")]
    HttpError(i32, String),
    #[error("Request Error: {0}")]
    Request(String),
    #[error("Deserialization Error: {0}")]
    Deserialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_skips_unset_fields() {
        let patch = TransactionPatch {
            amount: Some(-7.5),
            ..Default::default()
        };
        let body = UpdateTransactionRequest::from(&patch);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "amount": -7.5 }));
    }

    #[test]
    fn test_wire_transaction_converts_to_confirmed_domain_record() {
        let json = serde_json::json!({
            "id": "tx-42",
            "description": "Coffee",
            "amount": -5.0,
            "type": "expense",
            "date": "2026-08-01T09:00:00Z",
            "created_at": "2026-08-01T09:00:00Z",
            "updated_at": "2026-08-01T09:00:00Z",
        });
        let wire: ApiTransaction = serde_json::from_value(json).unwrap();
        let tx = wire.into_domain();
        assert_eq!(tx.id, TransactionId::Confirmed("tx-42".to_string()));
        assert!(!tx.id.is_pending());
        assert_eq!(tx.kind, TransactionKind::Expense);
    }
}
