//! Idempotency store adapters.
//!
//! Implementations of the IdempotencyStore port for different backends.
//!
//! ## Available Adapters
//!
//! - `InMemoryIdempotencyStore` - In-memory for testing and single-instance
//! - `RedisIdempotencyStore` - Redis-backed with native key expiry
//! - `PostgresIdempotencyStore` - PostgreSQL table with scheduled purge

mod in_memory;
mod postgres;
mod redis;

pub use in_memory::InMemoryIdempotencyStore;
pub use postgres::PostgresIdempotencyStore;
pub use self::redis::{RedisIdempotencyStore, DEFAULT_KEY_PREFIX};
