//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `IdempotencyStore` - Tombstones for processed Stripe webhook events

mod idempotency_store;

pub use idempotency_store::{
    IdempotencyStore, IdempotencyStoreError, ProcessedRecord, DEFAULT_RECORD_TTL_SECS,
};
