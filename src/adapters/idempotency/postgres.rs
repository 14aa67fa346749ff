//! PostgreSQL implementation of IdempotencyStore.
//!
//! Tombstones live in the `processed_events` table. Postgres has no native
//! row TTL, so lookups ignore rows past `expires_at` and `purge_expired`
//! deletes them on a schedule.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::foundation::Timestamp;
use crate::ports::{IdempotencyStore, IdempotencyStoreError, ProcessedRecord};

/// PostgreSQL implementation of the IdempotencyStore port.
#[derive(Clone)]
pub struct PostgresIdempotencyStore {
    pool: PgPool,
}

impl PostgresIdempotencyStore {
    /// Creates a new PostgresIdempotencyStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn run_migrations(&self) -> Result<(), IdempotencyStoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| IdempotencyStoreError::Unavailable(format!("migration failed: {}", e)))
    }

    /// Deletes rows expired as of `now`. Returns the number deleted.
    pub async fn purge_expired(&self, now: Timestamp) -> Result<u64, IdempotencyStoreError> {
        let result = sqlx::query("DELETE FROM processed_events WHERE expires_at <= $1")
            .bind(now.as_unix_secs())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                IdempotencyStoreError::Unavailable(format!("Failed to purge processed events: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl IdempotencyStore for PostgresIdempotencyStore {
    async fn exists(&self, event_id: &str) -> Result<bool, IdempotencyStoreError> {
        let found: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM processed_events
                WHERE id = $1 AND expires_at > $2
            )
            "#,
        )
        .bind(event_id)
        .bind(Timestamp::now().as_unix_secs())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            IdempotencyStoreError::Unavailable(format!("Failed to look up processed event: {}", e))
        })?;

        Ok(found)
    }

    async fn mark_processed(&self, record: &ProcessedRecord) -> Result<(), IdempotencyStoreError> {
        sqlx::query(
            r#"
            INSERT INTO processed_events (id, processed_at, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET
                processed_at = EXCLUDED.processed_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(&record.id)
        .bind(record.processed_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            IdempotencyStoreError::Unavailable(format!("Failed to record processed event: {}", e))
        })?;

        Ok(())
    }
}
