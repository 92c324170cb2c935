use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Durable key-value persistence used as the cache substrate
///
/// Keys and values are strings; the cache layer serializes its pages to JSON
/// before they land here. Implementations are shared via `Arc` and must be
/// safe to call concurrently.
#[async_trait]
pub trait DurableStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// All keys currently stored, in no particular order
    async fn list_keys(&self) -> Result<Vec<String>, StoreError>;

    /// Best-effort batch removal. Implementations keep going past per-key
    /// failures; a partial removal is safe because a leftover page key
    /// without a valid last-sync stamp is always treated as a cache miss.
    async fn remove_many(&self, keys: &[String]) -> Result<(), StoreError>;
}
