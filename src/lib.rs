//! fintrack-core: offline cache and optimistic-mutation engine for the
//! FinTrack mobile app.
//!
//! The transaction list is backed by a page cache over a durable key-value
//! store with one shared freshness stamp, a pagination controller that
//! re-paginates the server's full collection client-side, an optimistic
//! mutation engine (apply, confirm-or-revert, invalidate), and a
//! lifecycle/connectivity trigger that checks for server changes when the
//! app foregrounds or the network comes back.
//!
//! The UI host constructs a [`TransactionEngine`] from a
//! [`TransactionService`], a [`TransactionCache`] and a [`Notifier`],
//! subscribes to its state, and calls its read/write methods. None of those
//! methods return errors; failures surface as notifications plus a state
//! reset.

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod models;
pub mod notify;
pub mod store;
pub mod sync;
pub mod telemetry;

pub use api::{ApiError, HttpTransactionService, TransactionService};
pub use cache::{TransactionCache, DEFAULT_CACHE_TTL};
pub use config::{ConfigError, EngineConfig};
pub use engine::{EngineState, TransactionEngine, PAGE_SIZE};
pub use models::{
    NewTransaction, Transaction, TransactionId, TransactionKind, TransactionPatch,
};
pub use notify::{ChannelNotifier, LogNotifier, Notification, Notifier, NotifyLevel};
pub use store::{DurableStore, MemoryStore, SqliteStore, StoreError};
pub use sync::{AppPhase, LifecycleSignal, SyncHandle, SyncTrigger};
