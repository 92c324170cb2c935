//! Connectivity/lifecycle sync trigger
//!
//! Listens for app-foreground transitions and connectivity-restored edges
//! and runs a lightweight sync check on each, gated on an authenticated
//! session. The listener task and its optional interval timer are scoped to
//! that session: they exit when the auth channel reports false, when the
//! signal source closes, or when the handle shuts them down.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Interval;
use tracing::{debug, info};

use crate::cache::TransactionCache;

/// Coarse application lifecycle phase, as reported by the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    Active,
    Inactive,
    Background,
}

/// External signals the trigger reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleSignal {
    AppPhaseChanged(AppPhase),
    ConnectivityChanged { online: bool },
}

pub struct SyncTrigger;

/// Handle owning the spawned listener task
pub struct SyncHandle {
    task: JoinHandle<()>,
    cache: TransactionCache,
}

impl SyncTrigger {
    /// Spawn the listener
    ///
    /// `signals` delivers lifecycle/connectivity events from the host;
    /// `auth` is true while a user session is active; `check_interval`
    /// optionally runs the same lightweight check periodically.
    pub fn spawn(
        signals: mpsc::Receiver<LifecycleSignal>,
        cache: TransactionCache,
        auth: watch::Receiver<bool>,
        check_interval: Option<Duration>,
    ) -> SyncHandle {
        let task_cache = cache.clone();
        let task = tokio::spawn(run(signals, task_cache, auth, check_interval));
        SyncHandle { task, cache }
    }
}

impl SyncHandle {
    /// Explicit heavy pass: drop every cached page and re-stamp, so the next
    /// UI read refetches the whole collection. Never invoked by lifecycle
    /// events.
    pub async fn start_full_sync(&self) {
        info!("full sync requested");
        self.cache.invalidate_all().await;
        self.cache.mark_synced().await;
    }

    /// Stop the listener task immediately
    pub fn shutdown(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Lightweight pass run on every trigger: re-stamps the shared last-sync
/// timestamp. This is the hook point for a real delta fetch.
async fn check_server_changes(cache: &TransactionCache) {
    cache.mark_synced().await;
    debug!("sync check complete");
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

async fn run(
    mut signals: mpsc::Receiver<LifecycleSignal>,
    cache: TransactionCache,
    mut auth: watch::Receiver<bool>,
    check_interval: Option<Duration>,
) {
    // The host reports transitions; assume an active, online start
    let mut phase = AppPhase::Active;
    let mut online = true;

    let mut ticker = check_interval.map(|period| {
        let mut interval = tokio::time::interval(period);
        // Skip the immediate first tick; the first check fires one period in
        interval.reset();
        interval
    });

    loop {
        tokio::select! {
            changed = auth.changed() => {
                match changed {
                    Ok(()) => {
                        if !*auth.borrow() {
                            info!("auth session ended, stopping sync trigger");
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
            signal = signals.recv() => {
                let Some(signal) = signal else {
                    debug!("signal source closed, stopping sync trigger");
                    break;
                };
                match signal {
                    LifecycleSignal::AppPhaseChanged(next) => {
                        let foregrounded = matches!(
                            phase,
                            AppPhase::Inactive | AppPhase::Background
                        ) && next == AppPhase::Active;
                        phase = next;
                        if foregrounded && *auth.borrow() {
                            debug!("app foregrounded, checking for server changes");
                            check_server_changes(&cache).await;
                        }
                    }
                    LifecycleSignal::ConnectivityChanged { online: now_online } => {
                        let restored = !online && now_online;
                        online = now_online;
                        if restored && *auth.borrow() {
                            debug!("connectivity restored, checking for server changes");
                            check_server_changes(&cache).await;
                        }
                    }
                }
            }
            _ = tick(&mut ticker) => {
                if *auth.borrow() {
                    check_server_changes(&cache).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Transaction, TransactionId, TransactionKind};
    use crate::store::MemoryStore;
    use chrono::Utc;
    use std::sync::Arc;

    fn cache() -> TransactionCache {
        TransactionCache::new(Arc::new(MemoryStore::new()))
    }

    fn sample_page() -> Vec<Transaction> {
        let now = Utc::now();
        vec![Transaction {
            id: TransactionId::Confirmed("a".to_string()),
            description: "Coffee".to_string(),
            amount: -5.0,
            kind: TransactionKind::Expense,
            date: now,
            created_at: now,
            updated_at: now,
        }]
    }

    async fn wait_for_stamp(cache: &TransactionCache) -> bool {
        for _ in 0..100 {
            if cache.last_synced_at().await.is_some() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        false
    }

    #[tokio::test]
    async fn test_foreground_transition_stamps_last_sync() {
        let cache = cache();
        let (sig_tx, sig_rx) = mpsc::channel(8);
        let (_auth_tx, auth_rx) = watch::channel(true);
        let _handle = SyncTrigger::spawn(sig_rx, cache.clone(), auth_rx, None);

        sig_tx
            .send(LifecycleSignal::AppPhaseChanged(AppPhase::Background))
            .await
            .unwrap();
        sig_tx
            .send(LifecycleSignal::AppPhaseChanged(AppPhase::Active))
            .await
            .unwrap();

        assert!(wait_for_stamp(&cache).await);
    }

    #[tokio::test]
    async fn test_active_to_active_is_not_a_transition() {
        let cache = cache();
        let (sig_tx, sig_rx) = mpsc::channel(8);
        let (_auth_tx, auth_rx) = watch::channel(true);
        let _handle = SyncTrigger::spawn(sig_rx, cache.clone(), auth_rx, None);

        // The trigger assumes an active start, so this is not a foreground edge
        sig_tx
            .send(LifecycleSignal::AppPhaseChanged(AppPhase::Active))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.last_synced_at().await.is_none());
    }

    #[tokio::test]
    async fn test_connectivity_restored_stamps_last_sync() {
        let cache = cache();
        let (sig_tx, sig_rx) = mpsc::channel(8);
        let (_auth_tx, auth_rx) = watch::channel(true);
        let _handle = SyncTrigger::spawn(sig_rx, cache.clone(), auth_rx, None);

        sig_tx
            .send(LifecycleSignal::ConnectivityChanged { online: false })
            .await
            .unwrap();
        sig_tx
            .send(LifecycleSignal::ConnectivityChanged { online: true })
            .await
            .unwrap();

        assert!(wait_for_stamp(&cache).await);
    }

    #[tokio::test]
    async fn test_unauthenticated_signals_do_no_work() {
        let cache = cache();
        let (sig_tx, sig_rx) = mpsc::channel(8);
        let (_auth_tx, auth_rx) = watch::channel(false);
        let _handle = SyncTrigger::spawn(sig_rx, cache.clone(), auth_rx, None);

        sig_tx
            .send(LifecycleSignal::AppPhaseChanged(AppPhase::Background))
            .await
            .unwrap();
        sig_tx
            .send(LifecycleSignal::AppPhaseChanged(AppPhase::Active))
            .await
            .unwrap();
        sig_tx
            .send(LifecycleSignal::ConnectivityChanged { online: false })
            .await
            .unwrap();
        sig_tx
            .send(LifecycleSignal::ConnectivityChanged { online: true })
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.last_synced_at().await.is_none());
    }

    #[tokio::test]
    async fn test_listener_stops_when_auth_session_ends() {
        let cache = cache();
        let (_sig_tx, sig_rx) = mpsc::channel(8);
        let (auth_tx, auth_rx) = watch::channel(true);
        let handle = SyncTrigger::spawn(sig_rx, cache, auth_rx, None);

        auth_tx.send(false).unwrap();

        for _ in 0..100 {
            if handle.is_finished() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("sync trigger outlived the auth session");
    }

    #[tokio::test]
    async fn test_interval_runs_periodic_checks() {
        let cache = cache();
        let (_sig_tx, sig_rx) = mpsc::channel(8);
        let (_auth_tx, auth_rx) = watch::channel(true);
        let _handle = SyncTrigger::spawn(
            sig_rx,
            cache.clone(),
            auth_rx,
            Some(Duration::from_millis(20)),
        );

        assert!(wait_for_stamp(&cache).await);
    }

    #[tokio::test]
    async fn test_full_sync_clears_cache_and_restamps() {
        let cache = cache();
        cache.save_page(1, &sample_page()).await;
        cache.save_page(2, &sample_page()).await;

        let (_sig_tx, sig_rx) = mpsc::channel(8);
        let (_auth_tx, auth_rx) = watch::channel(true);
        let handle = SyncTrigger::spawn(sig_rx, cache.clone(), auth_rx, None);

        handle.start_full_sync().await;

        assert!(cache.load_page(1).await.is_none());
        assert!(cache.load_page(2).await.is_none());
        assert!(cache.last_synced_at().await.is_some());
    }
}
