//! Idempotency store configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_RECORD_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Backend holding processed-event tombstones
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IdempotencyBackend {
    /// Process-local map. Development and tests only.
    #[default]
    Memory,
    Redis,
    Postgres,
}

/// Idempotency configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdempotencyConfig {
    #[serde(default)]
    pub backend: IdempotencyBackend,

    /// Lifetime of a tombstone in seconds
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// How often expired Postgres rows are deleted
    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,
}

impl IdempotencyConfig {
    /// Get purge interval as Duration
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_secs)
    }

    /// Validate idempotency configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ttl_secs == 0 || self.ttl_secs > MAX_RECORD_TTL_SECS {
            return Err(ValidationError::InvalidRecordTtl);
        }
        if self.purge_interval_secs == 0 {
            return Err(ValidationError::InvalidPurgeInterval);
        }
        Ok(())
    }
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            backend: IdempotencyBackend::default(),
            ttl_secs: default_ttl(),
            purge_interval_secs: default_purge_interval(),
        }
    }
}

fn default_ttl() -> u64 {
    86_400
}

fn default_purge_interval() -> u64 {
    3600
}
