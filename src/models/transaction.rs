//! Transaction domain types

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

lazy_static! {
    // Session nonce for pending identifiers. Pending ids only need to be
    // unique within one app session; they are replaced by server ids on
    // confirmation and are never written to the durable store.
    static ref SESSION_NONCE: String = Uuid::new_v4().simple().to_string();
}

static PENDING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Transaction identifier
///
/// `Confirmed` carries a server-assigned id. `Pending` carries a
/// client-minted id for an optimistic record whose create call is still in
/// flight. The two are distinct variants (not a string prefix) so a pending
/// id can never be mistaken for, or stored as, a confirmed one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "lowercase")]
pub enum TransactionId {
    Confirmed(String),
    Pending(String),
}

impl TransactionId {
    /// Mint a fresh pending identifier, unique within this session
    pub fn new_pending() -> Self {
        let seq = PENDING_SEQ.fetch_add(1, Ordering::Relaxed);
        TransactionId::Pending(format!("{}-{}", *SESSION_NONCE, seq))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, TransactionId::Pending(_))
    }

    /// The raw identifier string, whichever variant holds it
    pub fn as_str(&self) -> &str {
        match self {
            TransactionId::Confirmed(id) => id,
            TransactionId::Pending(id) => id,
        }
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

/// A single transaction in the in-memory list and the page cache
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub description: String,
    /// Signed amount; expenses are negative
    pub amount: f64,
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub description: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub date: DateTime<Utc>,
}

/// Partial update; only set fields are applied and sent to the server
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub kind: Option<TransactionKind>,
    pub date: Option<DateTime<Utc>>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.kind.is_none()
            && self.date.is_none()
    }

    /// Apply the set fields to a transaction in place
    pub fn apply_to(&self, tx: &mut Transaction) {
        if let Some(description) = &self.description {
            tx.description = description.clone();
        }
        if let Some(amount) = self.amount {
            tx.amount = amount;
        }
        if let Some(kind) = self.kind {
            tx.kind = kind;
        }
        if let Some(date) = self.date {
            tx.date = date;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transaction {
        let now = Utc::now();
        Transaction {
            id: TransactionId::Confirmed("tx-1".to_string()),
            description: "Coffee".to_string(),
            amount: -5.0,
            kind: TransactionKind::Expense,
            date: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_pending_ids_are_unique() {
        let a = TransactionId::new_pending();
        let b = TransactionId::new_pending();
        assert_ne!(a, b);
        assert!(a.is_pending());
        assert!(b.is_pending());
    }

    #[test]
    fn test_pending_id_survives_serde_round_trip_as_pending() {
        let id = TransactionId::new_pending();
        let json = serde_json::to_string(&id).expect("serialize failed");
        let back: TransactionId = serde_json::from_str(&json).expect("deserialize failed");
        assert!(back.is_pending());
        assert_eq!(id, back);
    }

    #[test]
    fn test_confirmed_and_pending_with_same_raw_id_differ() {
        let confirmed = TransactionId::Confirmed("abc".to_string());
        let pending = TransactionId::Pending("abc".to_string());
        assert_ne!(confirmed, pending);
        assert_eq!(confirmed.as_str(), pending.as_str());
    }

    #[test]
    fn test_patch_applies_only_set_fields() {
        let mut tx = sample();
        let patch = TransactionPatch {
            amount: Some(-7.5),
            ..Default::default()
        };
        patch.apply_to(&mut tx);
        assert_eq!(tx.amount, -7.5);
        assert_eq!(tx.description, "Coffee");
        assert_eq!(tx.kind, TransactionKind::Expense);
    }

    #[test]
    fn test_empty_patch_is_empty() {
        assert!(TransactionPatch::default().is_empty());
        let patch = TransactionPatch {
            description: Some("Tea".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }
}
