//! SQLite-backed durable store
//!
//! Persists cache pages in a single `kv` table on the device. The table is
//! created on connect, mirroring how the rest of the app provisions its
//! schema at startup.

use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{info, warn};

use super::{DurableStore, StoreError};

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the store at the given SQLite URL and ensure the
    /// `kv` table exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        // A single connection: `sqlite::memory:` databases are per-connection,
        // and the on-device file store has no concurrent writers.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;

        sqlx::query("CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)")
            .execute(&pool)
            .await?;

        info!("SQLite store initialized at {}", url);
        Ok(Self { pool })
    }

    /// Purely in-memory store, used by tests
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:").await
    }
}

#[async_trait]
impl DurableStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query_as::<_, (String,)>("SELECT value FROM kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO kv (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query_as::<_, (String,)>("SELECT key FROM kv")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(key,)| key).collect())
    }

    async fn remove_many(&self, keys: &[String]) -> Result<(), StoreError> {
        // Best-effort batch: keep deleting past per-key failures
        for key in keys {
            if let Err(e) = self.remove(key).await {
                warn!("Failed to remove key '{}': {}", key, e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_round_trip_and_overwrite() {
        let store = SqliteStore::in_memory().await.expect("store init failed");

        assert_eq!(store.get("page_1").await.unwrap(), None);
        store.set("page_1", "[1,2,3]").await.unwrap();
        assert_eq!(
            store.get("page_1").await.unwrap(),
            Some("[1,2,3]".to_string())
        );

        store.set("page_1", "[4]").await.unwrap();
        assert_eq!(store.get("page_1").await.unwrap(), Some("[4]".to_string()));
    }

    #[tokio::test]
    async fn test_list_keys_and_remove_many() {
        let store = SqliteStore::in_memory().await.expect("store init failed");
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.set("c", "3").await.unwrap();

        let mut keys = store.list_keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "c"]);

        store
            .remove_many(&["a".to_string(), "c".to_string()])
            .await
            .unwrap();
        assert_eq!(store.list_keys().await.unwrap(), vec!["b"]);
    }
}
