//! IdempotencyStore port - Tombstones for webhook events already processed.
//!
//! Stripe delivers webhooks at least once. The intake pipeline checks this
//! store before dispatching and writes a tombstone after dispatch succeeds,
//! so a redelivered event id is acknowledged without running handlers again.
//!
//! ## Expiry
//!
//! Records carry an absolute expiry. A record past its expiry is logically
//! absent: `exists` must return `false` for it even if the backend has not
//! evicted it yet. Deduplication is therefore bounded by the TTL, which should
//! exceed the redelivery window configured for the Stripe account.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Default tombstone lifetime: 24 hours.
pub const DEFAULT_RECORD_TTL_SECS: u64 = 86_400;

/// Tombstone for a processed event. Carries no payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    /// Stripe event id (`evt_...`).
    pub id: String,
    /// Unix seconds when the event was marked processed.
    pub processed_at: i64,
    /// Unix seconds after which the record is logically absent.
    pub expires_at: i64,
}

impl ProcessedRecord {
    /// Creates a record with `expires_at = processed_at + ttl_secs`.
    pub fn new(id: impl Into<String>, processed_at: Timestamp, ttl_secs: u64) -> Self {
        Self {
            id: id.into(),
            processed_at: processed_at.as_unix_secs(),
            expires_at: processed_at.plus_secs(ttl_secs).as_unix_secs(),
        }
    }

    /// Seconds between `processed_at` and `expires_at`.
    pub fn ttl_secs(&self) -> u64 {
        self.expires_at.saturating_sub(self.processed_at).max(0) as u64
    }

    /// Returns true once `now` has reached `expires_at`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.as_unix_secs() >= self.expires_at
    }
}

/// Errors from an idempotency backend.
///
/// Whatever went wrong, the intake fails closed and lets Stripe redeliver,
/// so callers never need to tell failures apart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdempotencyStoreError {
    /// Backend unreachable, timed out, or returned an error.
    #[error("idempotency store unavailable: {0}")]
    Unavailable(String),
}

/// Port for recording which webhook events have been processed.
///
/// Implementations are shared across concurrent requests and must be safe to
/// call from many tasks at once. No locking is expected between `exists` and
/// `mark_processed`; two simultaneous deliveries of one id may both see
/// `false`.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Returns `true` iff a non-expired record exists for `event_id`.
    ///
    /// Must return `Err` when the backend cannot answer. Never guess.
    async fn exists(&self, event_id: &str) -> Result<bool, IdempotencyStoreError>;

    /// Writes the tombstone. Writing the same id twice is harmless.
    async fn mark_processed(&self, record: &ProcessedRecord) -> Result<(), IdempotencyStoreError>;
}
