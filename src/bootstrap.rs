//! Wiring from [`AppConfig`] to a ready-to-serve router.
//!
//! Everything here runs once at startup. Failures are reported as
//! [`StartupError`] and stop the process before it accepts traffic.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapters::http::{webhook_router, WebhookAppState};
use crate::adapters::idempotency::{
    InMemoryIdempotencyStore, PostgresIdempotencyStore, RedisIdempotencyStore,
};
use crate::application::handlers::{payment_event_registry, IntakeWebhookHandler};
use crate::config::{AppConfig, ConfigError, IdempotencyBackend, ValidationError};
use crate::domain::foundation::Timestamp;
use crate::domain::webhook::{RegistryError, WebhookVerifier};
use crate::ports::{IdempotencyStore, IdempotencyStoreError};

/// Errors that stop the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    #[error("Handler registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("Idempotency store: {0}")]
    Store(#[from] IdempotencyStoreError),

    #[error("Database connection failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// The idempotency backend selected by configuration.
#[derive(Clone)]
pub enum ConfiguredStore {
    Memory(InMemoryIdempotencyStore),
    Redis(RedisIdempotencyStore),
    Postgres(PostgresIdempotencyStore),
}

impl ConfiguredStore {
    /// Connect to the configured backend, running migrations if asked to.
    pub async fn connect(config: &AppConfig) -> Result<Self, StartupError> {
        match config.idempotency.backend {
            IdempotencyBackend::Memory => Ok(Self::Memory(InMemoryIdempotencyStore::new())),
            IdempotencyBackend::Redis => {
                let redis = config
                    .redis
                    .as_ref()
                    .ok_or(ValidationError::MissingRequired("REDIS__URL"))?;
                let store = RedisIdempotencyStore::connect(&redis.url)
                    .await?
                    .with_key_prefix(redis.key_prefix.clone())
                    .with_timeout(redis.timeout());
                Ok(Self::Redis(store))
            }
            IdempotencyBackend::Postgres => {
                let database = config
                    .database
                    .as_ref()
                    .ok_or(ValidationError::MissingRequired("DATABASE__URL"))?;
                let pool = database.pool_options().connect(&database.url).await?;
                let store = PostgresIdempotencyStore::new(pool);
                if database.run_migrations {
                    store.run_migrations().await?;
                    info!("Applied processed_events migrations");
                }
                Ok(Self::Postgres(store))
            }
        }
    }

    pub fn backend(&self) -> IdempotencyBackend {
        match self {
            Self::Memory(_) => IdempotencyBackend::Memory,
            Self::Redis(_) => IdempotencyBackend::Redis,
            Self::Postgres(_) => IdempotencyBackend::Postgres,
        }
    }

    /// The store as the port the pipeline consumes.
    pub fn shared(&self) -> Arc<dyn IdempotencyStore> {
        match self {
            Self::Memory(store) => Arc::new(store.clone()),
            Self::Redis(store) => Arc::new(store.clone()),
            Self::Postgres(store) => Arc::new(store.clone()),
        }
    }

    /// Redis expires keys itself; the other backends need a sweep.
    pub fn needs_purge(&self) -> bool {
        !matches!(self, Self::Redis(_))
    }

    /// Delete records expired as of `now`. Returns how many were removed.
    pub async fn purge_expired(&self, now: Timestamp) -> Result<u64, IdempotencyStoreError> {
        match self {
            Self::Memory(store) => Ok(store.purge_expired(now).await as u64),
            Self::Redis(_) => Ok(0),
            Self::Postgres(store) => store.purge_expired(now).await,
        }
    }
}

/// Build the intake pipeline over the given store.
pub fn build_intake(
    config: &AppConfig,
    store: Arc<dyn IdempotencyStore>,
) -> Result<IntakeWebhookHandler, StartupError> {
    let registry = payment_event_registry()?;
    info!(bindings = ?registry, "Handler registry built");

    let verifier = WebhookVerifier::new(config.stripe.webhook_secret.clone())
        .with_tolerance_secs(config.stripe.signature_tolerance_secs);

    Ok(
        IntakeWebhookHandler::new(Arc::new(verifier), store, Arc::new(registry))
            .with_record_ttl_secs(config.idempotency.ttl_secs),
    )
}

/// Build the complete router over the given store.
pub fn build_app(
    config: &AppConfig,
    store: Arc<dyn IdempotencyStore>,
) -> Result<Router, StartupError> {
    let intake = build_intake(config, store)?;
    Ok(webhook_router(
        WebhookAppState::new(intake),
        config.server.request_timeout(),
    ))
}

/// Periodically delete expired tombstones until the task is aborted.
pub fn spawn_purge_task(store: ConfiguredStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick completes immediately; skip it so startup is not a sweep.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match store.purge_expired(Timestamp::now()).await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Purged expired idempotency records"),
                Err(err) => warn!(error = %err, "Failed to purge expired idempotency records"),
            }
        }
    })
}
