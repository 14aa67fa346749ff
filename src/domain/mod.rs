//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives
//! - `webhook` - Stripe webhook verification, events and dispatch

pub mod foundation;
pub mod webhook;
