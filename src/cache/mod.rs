//! Page cache for the transaction list
//!
//! Each page is stored under its own key; freshness is governed by one shared
//! last-sync timestamp, so a single write stamps every cached page at once and
//! a single expiry stales them all. The cache is an accelerator, never a
//! correctness dependency: every store failure degrades to a miss.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::Transaction;
use crate::store::DurableStore;

const PAGE_KEY_PREFIX: &str = "fintrack_cache_page_";
const LAST_SYNC_KEY: &str = "fintrack_cache_last_sync";

/// Default time-to-live for cached pages: 5 minutes
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
pub struct TransactionCache {
    store: Arc<dyn DurableStore>,
    ttl: Duration,
}

impl TransactionCache {
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self::with_ttl(store, DEFAULT_CACHE_TTL)
    }

    pub fn with_ttl(store: Arc<dyn DurableStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn page_key(page: u32) -> String {
        format!("{}{}", PAGE_KEY_PREFIX, page)
    }

    fn ttl_delta(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::MAX)
    }

    /// Cached transactions for a page, or `None` on a miss
    ///
    /// A miss covers: no page value, no last-sync stamp, a stamp older than
    /// the TTL, and any store or decode failure.
    pub async fn load_page(&self, page: u32) -> Option<Vec<Transaction>> {
        let stamp = self.last_synced_at().await?;
        if Utc::now().signed_duration_since(stamp) >= self.ttl_delta() {
            debug!("cache stale for page {} (last sync {})", page, stamp);
            return None;
        }

        let raw = match self.store.get(&Self::page_key(page)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("cache read failed for page {}: {}", page, e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(transactions) => {
                debug!("cache hit for page {}", page);
                Some(transactions)
            }
            Err(e) => {
                warn!("cache payload corrupt for page {}: {}", page, e);
                None
            }
        }
    }

    /// Persist a page and stamp the shared last-sync timestamp
    ///
    /// Pending (unconfirmed) entries are filtered out; only server-confirmed
    /// records ever reach the durable store.
    pub async fn save_page(&self, page: u32, transactions: &[Transaction]) {
        let confirmed: Vec<&Transaction> = transactions
            .iter()
            .filter(|tx| !tx.id.is_pending())
            .collect();

        let payload = match serde_json::to_string(&confirmed) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("failed to serialize page {}: {}", page, e);
                return;
            }
        };

        if let Err(e) = self.store.set(&Self::page_key(page), &payload).await {
            warn!("cache write failed for page {}: {}", page, e);
            return;
        }
        self.mark_synced().await;
    }

    /// Remove every cached page and the last-sync stamp. Idempotent.
    pub async fn invalidate_all(&self) {
        let keys = match self.store.list_keys().await {
            Ok(keys) => keys,
            Err(e) => {
                warn!("cache invalidation failed to enumerate keys: {}", e);
                return;
            }
        };

        let mut stale: Vec<String> = keys
            .into_iter()
            .filter(|key| key.starts_with(PAGE_KEY_PREFIX))
            .collect();
        stale.push(LAST_SYNC_KEY.to_string());

        if let Err(e) = self.store.remove_many(&stale).await {
            warn!("cache invalidation failed: {}", e);
        }
    }

    /// Drop a single cached page so the next read of it goes remote
    pub async fn drop_page(&self, page: u32) {
        if let Err(e) = self.store.remove(&Self::page_key(page)).await {
            warn!("failed to drop cached page {}: {}", page, e);
        }
    }

    /// Re-stamp the shared last-sync timestamp to now
    pub async fn mark_synced(&self) {
        let stamp = Utc::now().to_rfc3339();
        if let Err(e) = self.store.set(LAST_SYNC_KEY, &stamp).await {
            warn!("failed to stamp last-sync: {}", e);
        }
    }

    /// The shared last-sync timestamp, if one is stored and parseable
    pub async fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        let raw = match self.store.get(LAST_SYNC_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("failed to read last-sync stamp: {}", e);
                return None;
            }
        };
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(stamp) => Some(stamp.with_timezone(&Utc)),
            Err(e) => {
                warn!("last-sync stamp corrupt ({}): {}", raw, e);
                None
            }
        }
    }
}
