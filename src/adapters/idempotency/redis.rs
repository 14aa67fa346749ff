//! Redis-backed idempotency store for production deployments.
//!
//! Each tombstone is a JSON string under `<prefix><event id>` with a Redis
//! TTL, so expiry is enforced by the backend. Shared by every instance.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::Timestamp;
use crate::ports::{IdempotencyStore, IdempotencyStoreError, ProcessedRecord};

/// Default key prefix for tombstones.
pub const DEFAULT_KEY_PREFIX: &str = "processed_event:";

const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

/// Redis-backed idempotency store.
///
/// Writes use `SET key value EX ttl`; lookups use `EXISTS`. A command that
/// errors or exceeds the timeout is reported as `Unavailable`.
#[derive(Clone)]
pub struct RedisIdempotencyStore {
    conn: MultiplexedConnection,
    key_prefix: String,
    timeout: Duration,
}

impl RedisIdempotencyStore {
    /// Create a store over an existing connection.
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Open a multiplexed connection to `url` and wrap it.
    pub async fn connect(url: &str) -> Result<Self, IdempotencyStoreError> {
        let client = redis::Client::open(url)
            .map_err(|e| IdempotencyStoreError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| IdempotencyStoreError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn))
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Upper bound for each Redis command.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn key(&self, event_id: &str) -> String {
        format!("{}{}", self.key_prefix, event_id)
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, IdempotencyStoreError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result.map_err(|e| IdempotencyStoreError::Unavailable(e.to_string())),
            Err(_) => Err(IdempotencyStoreError::Unavailable(format!(
                "redis command timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

/// Seconds the key should live, measured from `now`. Never below one so a
/// late write still lands and expires promptly.
fn remaining_ttl_secs(record: &ProcessedRecord, now: Timestamp) -> u64 {
    record.expires_at.saturating_sub(now.as_unix_secs()).max(1) as u64
}

#[async_trait]
impl IdempotencyStore for RedisIdempotencyStore {
    async fn exists(&self, event_id: &str) -> Result<bool, IdempotencyStoreError> {
        let key = self.key(event_id);
        let mut conn = self.conn.clone();

        self.bounded(conn.exists::<_, bool>(&key)).await
    }

    async fn mark_processed(&self, record: &ProcessedRecord) -> Result<(), IdempotencyStoreError> {
        let key = self.key(&record.id);
        let value = serde_json::to_string(record)
            .map_err(|e| IdempotencyStoreError::Unavailable(e.to_string()))?;
        let ttl = remaining_ttl_secs(record, Timestamp::now());
        let mut conn = self.conn.clone();

        let mut cmd = redis::cmd("SET");
        cmd.arg(&key).arg(value).arg("EX").arg(ttl);

        self.bounded(cmd.query_async::<_, ()>(&mut conn)).await
    }
}
