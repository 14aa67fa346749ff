//! In-memory idempotency store for testing and development.
//!
//! Tombstones live in a process-local HashMap and vanish on restart.
//! Not suitable for production multi-instance deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::Timestamp;
use crate::ports::{IdempotencyStore, IdempotencyStoreError, ProcessedRecord};

/// In-memory idempotency store.
///
/// Expired records are treated as absent and evicted lazily on lookup;
/// `purge_expired` sweeps the rest.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdempotencyStore {
    records: Arc<RwLock<HashMap<String, ProcessedRecord>>>,
}

impl InMemoryIdempotencyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored record, expired or not.
    pub async fn get(&self, event_id: &str) -> Option<ProcessedRecord> {
        self.records.read().await.get(event_id).cloned()
    }

    /// Number of records held, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Removes every record expired as of `now`. Returns how many were removed.
    pub async fn purge_expired(&self, now: Timestamp) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        before - records.len()
    }
}

#[async_trait]
impl IdempotencyStore for InMemoryIdempotencyStore {
    async fn exists(&self, event_id: &str) -> Result<bool, IdempotencyStoreError> {
        let now = Timestamp::now();

        {
            let records = self.records.read().await;
            match records.get(event_id) {
                None => return Ok(false),
                Some(record) if !record.is_expired(now) => return Ok(true),
                Some(_) => {}
            }
        }

        // Expired: evict unless a fresh write replaced it meanwhile.
        let mut records = self.records.write().await;
        if records
            .get(event_id)
            .is_some_and(|record| record.is_expired(now))
        {
            records.remove(event_id);
            return Ok(false);
        }
        Ok(records.contains_key(event_id))
    }

    async fn mark_processed(&self, record: &ProcessedRecord) -> Result<(), IdempotencyStoreError> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }
}
