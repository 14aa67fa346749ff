//! Foundation module - Shared domain primitives.
//!
//! Value objects that form the common vocabulary of the webhook service.

mod timestamp;

pub use timestamp::Timestamp;
