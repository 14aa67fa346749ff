//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `http` - Axum entry point for Stripe deliveries
//! - `idempotency` - Tombstone stores (in-memory, Redis, PostgreSQL)

pub mod http;
pub mod idempotency;

pub use idempotency::{InMemoryIdempotencyStore, PostgresIdempotencyStore, RedisIdempotencyStore};
