//! Configuration error types

use thiserror::Error;

/// The environment could not be read into [`AppConfig`](super::AppConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),
}

/// A loaded value the service refuses to start with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    // server
    #[error("Port must be non-zero")]
    InvalidPort,

    #[error("Cannot bind to {0}")]
    InvalidBindAddress(String),

    #[error("Request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    // stripe
    #[error("Stripe webhook secret must start with whsec_")]
    InvalidStripeWebhookSecret,

    #[error("Signature tolerance must be between 1 and 3600 seconds")]
    InvalidSignatureTolerance,

    // idempotency
    #[error("Idempotency record TTL must be between 1 second and 365 days")]
    InvalidRecordTtl,

    #[error("Purge interval must be greater than zero")]
    InvalidPurgeInterval,

    #[error("In-memory idempotency backend is not allowed in production")]
    MemoryBackendInProduction,

    // backends
    #[error("Redis URL must use redis:// or rediss://")]
    InvalidRedisUrl,

    #[error("Redis command timeout must be greater than zero")]
    InvalidRedisTimeout,

    #[error("Database URL must use postgres:// or postgresql://")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,
}
