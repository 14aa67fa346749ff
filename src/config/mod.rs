//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `WEBHOOK_SERVICE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use stripe_webhook_service::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod database;
mod error;
mod idempotency;
mod redis;
mod server;
mod stripe;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use idempotency::{IdempotencyBackend, IdempotencyConfig};
pub use self::redis::RedisConfig;
pub use server::{Environment, ServerConfig};
pub use stripe::StripeConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Stripe webhook signing configuration
    pub stripe: StripeConfig,

    /// Tombstone backend and lifetime
    #[serde(default)]
    pub idempotency: IdempotencyConfig,

    /// Redis connection, required for the `redis` backend
    #[serde(default)]
    pub redis: Option<RedisConfig>,

    /// PostgreSQL connection, required for the `postgres` backend
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `WEBHOOK_SERVICE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `WEBHOOK_SERVICE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `WEBHOOK_SERVICE__STRIPE__WEBHOOK_SECRET=whsec_...` -> `stripe.webhook_secret`
    /// - `WEBHOOK_SERVICE__IDEMPOTENCY__BACKEND=redis` -> `idempotency.backend`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("WEBHOOK_SERVICE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// Checks each section, then the cross-section rules:
    /// - the selected backend has its connection section
    /// - production never uses the process-local backend
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.stripe.validate()?;
        self.idempotency.validate()?;

        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        if let Some(database) = &self.database {
            database.validate()?;
        }

        match self.idempotency.backend {
            IdempotencyBackend::Memory if self.is_production() => {
                return Err(ValidationError::MemoryBackendInProduction);
            }
            IdempotencyBackend::Redis if self.redis.is_none() => {
                return Err(ValidationError::MissingRequired("REDIS__URL"));
            }
            IdempotencyBackend::Postgres if self.database.is_none() => {
                return Err(ValidationError::MissingRequired("DATABASE__URL"));
            }
            _ => {}
        }

        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
