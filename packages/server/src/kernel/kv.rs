//! Key-value store abstraction.
//!
//! The whole persistence surface of the hub is a flat string-to-JSON
//! namespace: individual submission records plus the per-type pending
//! and approved indices. Referential integrity between a record and
//! the indices that mention it is a convention upheld by the submission
//! service's write order, not by the store.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;

/// Persistence failure surfaced to callers.
///
/// Write failures must never be swallowed: the pending-index invariant
/// only means something if the caller learns that a write did not land.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Durable string-to-JSON mapping.
///
/// `get` on a missing key is `Ok(None)`, never an error. Writes are
/// durable when the call returns.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Persist `value` under `key`, replacing any prior value.
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Fetch the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Remove `key`; returns whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Whether `key` currently exists.
    async fn has(&self, key: &str) -> Result<bool, StoreError>;

    /// All keys in the namespace (ordering unspecified).
    async fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Remove every key.
    async fn clear(&self) -> Result<(), StoreError>;
}

/// Postgres-backed store: one `kv_store` table with a JSONB value column.
///
/// Single-writer-at-a-time semantics per key come from the primary-key
/// upsert; this is not a distributed store.
pub struct PostgresKvStore {
    pool: PgPool,
}

impl PostgresKvStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KvStore for PostgresKvStore {
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE SET value = $2, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let row: Option<(Value,)> =
            sqlx::query_as("SELECT value FROM kv_store WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(value,)| value))
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn has(&self, key: &str) -> Result<bool, StoreError> {
        let row: Option<(bool,)> =
            sqlx::query_as("SELECT true FROM kv_store WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn keys(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as("SELECT key FROM kv_store")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(|(key,)| key).collect())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_store").execute(&self.pool).await?;
        Ok(())
    }
}
