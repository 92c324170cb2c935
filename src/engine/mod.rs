//! Transaction list engine: pagination over a remote collection plus
//! optimistic create/update/delete.
//!
//! Reads go cache-first and fall through to the gateway; the gateway returns
//! the full collection and the engine slices the requested page out of it.
//! Writes follow apply → confirm-or-revert → invalidate: the in-memory list
//! changes before the network call is dispatched, the server's answer either
//! confirms the record or rolls the list back, and a successful write drops
//! the first cached page so the next read is forced fresh.
//!
//! No method here returns an error; failures end in a notification plus a
//! state reset, so the UI can never get stuck on a loading flag or a
//! half-applied write.

use chrono::Utc;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{HttpTransactionService, TransactionService};
use crate::cache::TransactionCache;
use crate::config::EngineConfig;
use crate::models::{NewTransaction, Transaction, TransactionId, TransactionPatch};
use crate::notify::Notifier;
use crate::store::DurableStore;

/// Fixed page size for the transaction list
pub const PAGE_SIZE: usize = 20;

/// Snapshot of everything the UI renders from
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Ordered transaction list; exactly one entry per identifier
    pub transactions: Vec<Transaction>,
    pub loading: bool,
    pub refreshing: bool,
    pub has_more: bool,
    /// 1-based page number of the last successful load
    pub page: u32,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            transactions: Vec::new(),
            loading: false,
            refreshing: false,
            has_more: true,
            page: 1,
        }
    }
}

pub struct TransactionEngine {
    service: Arc<dyn TransactionService>,
    cache: TransactionCache,
    notifier: Arc<dyn Notifier>,
    page_size: usize,
    state: watch::Sender<EngineState>,
}

impl TransactionEngine {
    pub fn new(
        service: Arc<dyn TransactionService>,
        cache: TransactionCache,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_page_size(service, cache, notifier, PAGE_SIZE)
    }

    pub fn with_page_size(
        service: Arc<dyn TransactionService>,
        cache: TransactionCache,
        notifier: Arc<dyn Notifier>,
        page_size: usize,
    ) -> Self {
        let (state, _) = watch::channel(EngineState::default());
        Self {
            service,
            cache,
            notifier,
            page_size,
            state,
        }
    }

    /// Wire up the production stack: HTTP gateway plus a cache over the
    /// given store, sized per the configuration
    pub fn from_config(
        config: &EngineConfig,
        store: Arc<dyn DurableStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let service = Arc::new(HttpTransactionService::new(
            config.api_base_url.clone(),
            config.api_token.clone(),
        ));
        let cache = TransactionCache::with_ttl(store, config.cache_ttl);
        Self::with_page_size(service, cache, notifier, config.page_size)
    }

    /// Reactive handle for the UI; every state change is published here
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.state.subscribe()
    }

    /// Current state snapshot
    pub fn state(&self) -> EngineState {
        self.state.borrow().clone()
    }

    /// Load the first page (cache-first)
    pub async fn load_transactions(&self) {
        self.load_page(1, false).await;
    }

    /// Load the next page; no-op unless more pages exist and no load is in
    /// flight
    pub async fn load_more(&self) {
        let (page, has_more, loading) = {
            let s = self.state.borrow();
            (s.page, s.has_more, s.loading)
        };
        if !has_more || loading {
            return;
        }
        self.load_page(page + 1, false).await;
    }

    /// Full refresh: reset pagination, clear the cache, refetch page 1
    pub async fn refresh(&self) {
        self.state.send_modify(|s| {
            s.page = 1;
            s.has_more = true;
        });
        self.cache.invalidate_all().await;
        self.load_page(1, true).await;
    }

    async fn load_page(&self, page: u32, is_refresh: bool) {
        {
            let s = self.state.borrow();
            // The loading flag is the only read-side mutual exclusion; it
            // drops duplicate concurrent fetches but does not arbitrate
            // against writes.
            if s.loading && !is_refresh {
                debug!("load for page {} dropped, another load in flight", page);
                return;
            }
        }

        self.state.send_modify(|s| {
            if is_refresh {
                s.refreshing = true;
            } else {
                s.loading = true;
            }
        });

        if !is_refresh {
            if let Some(cached) = self.cache.load_page(page).await {
                debug!("serving page {} from cache", page);
                // A cache hit merges the list but leaves has_more and the
                // sync stamp alone; only the gateway is authoritative for
                // collection length.
                self.state.send_modify(move |s| {
                    if page == 1 {
                        s.transactions = cached;
                    } else {
                        s.transactions.extend(cached);
                    }
                    s.page = page;
                    s.loading = false;
                    s.refreshing = false;
                });
                return;
            }
        }

        match self.service.list().await {
            Ok(all) => {
                let start = (page as usize - 1) * self.page_size;
                let slice: Vec<Transaction> = all
                    .into_iter()
                    .skip(start)
                    .take(self.page_size)
                    .collect();
                let has_more = slice.len() == self.page_size;

                self.cache.save_page(page, &slice).await;
                self.state.send_modify(move |s| {
                    if page == 1 || is_refresh {
                        s.transactions = slice;
                    } else {
                        s.transactions.extend(slice);
                    }
                    s.has_more = has_more;
                    s.page = page;
                    s.loading = false;
                    s.refreshing = false;
                });
            }
            Err(e) => {
                warn!("failed to fetch transactions: {}", e);
                // Treated as if the call never started: list, page and
                // has_more stay untouched.
                self.state.send_modify(|s| {
                    s.loading = false;
                    s.refreshing = false;
                });
                self.notifier.error("Failed to load transactions");
            }
        }
    }

    /// Optimistically create a transaction
    ///
    /// The record is visible at the head of the list, under a pending id,
    /// before the create request is dispatched. On confirmation the pending
    /// record is replaced in place by the server's; on failure it is
    /// filtered back out.
    pub async fn add_transaction(&self, new: NewTransaction) {
        let now = Utc::now();
        let optimistic = Transaction {
            id: TransactionId::new_pending(),
            description: new.description.clone(),
            amount: new.amount,
            kind: new.kind,
            date: new.date,
            created_at: now,
            updated_at: now,
        };
        let temp_id = optimistic.id.clone();

        self.state
            .send_modify(move |s| s.transactions.insert(0, optimistic));

        match self.service.create(&new).await {
            Ok(confirmed) => {
                self.state.send_modify(move |s| {
                    if let Some(pos) = s.transactions.iter().position(|t| t.id == temp_id) {
                        s.transactions[pos] = confirmed;
                    }
                });
                self.cache.drop_page(1).await;
                self.notifier.success("Transaction added");
            }
            Err(e) => {
                warn!("create failed, removing optimistic record: {}", e);
                self.state
                    .send_modify(move |s| s.transactions.retain(|t| t.id != temp_id));
                self.notifier.error("Failed to add transaction");
            }
        }
    }

    /// Optimistically apply a partial update
    ///
    /// Rollback restores the full pre-mutation snapshot, so any other
    /// optimistic change made while this call was in flight is reverted with
    /// it. Mutations come from a single-user UI one at a time; serializing
    /// them through a queue would be the hardened alternative.
    pub async fn update_transaction(&self, id: &TransactionId, patch: TransactionPatch) {
        let snapshot = self.state.borrow().transactions.clone();

        let mut found = false;
        self.state.send_modify(|s| {
            if let Some(tx) = s.transactions.iter_mut().find(|t| &t.id == id) {
                patch.apply_to(tx);
                tx.updated_at = Utc::now();
                found = true;
            }
        });
        if !found {
            warn!("update requested for unknown transaction {}", id);
            self.notifier.error("Transaction not found");
            return;
        }

        match self.service.update(id.as_str(), &patch).await {
            Ok(confirmed) => {
                self.state.send_modify(move |s| {
                    if let Some(pos) = s.transactions.iter().position(|t| &t.id == id) {
                        s.transactions[pos] = confirmed;
                    }
                });
                self.cache.drop_page(1).await;
                self.notifier.success("Transaction updated");
            }
            Err(e) => {
                warn!("update failed, restoring snapshot: {}", e);
                self.state.send_modify(move |s| s.transactions = snapshot);
                self.notifier.error("Failed to update transaction");
            }
        }
    }

    /// Optimistically delete a transaction
    ///
    /// Same rollback policy as `update_transaction`.
    pub async fn delete_transaction(&self, id: &TransactionId) {
        let snapshot = self.state.borrow().transactions.clone();

        self.state
            .send_modify(|s| s.transactions.retain(|t| &t.id != id));

        match self.service.delete(id.as_str()).await {
            Ok(()) => {
                self.cache.drop_page(1).await;
                self.notifier.success("Transaction deleted");
            }
            Err(e) => {
                warn!("delete failed, restoring snapshot: {}", e);
                self.state.send_modify(move |s| s.transactions = snapshot);
                self.notifier.error("Failed to delete transaction");
            }
        }
    }
}
