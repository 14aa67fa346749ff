//! Stripe Webhook Service - Authenticated, idempotent webhook intake
//!
//! This crate receives Stripe webhook deliveries, verifies their signatures,
//! deduplicates them by event id and dispatches each new event to a typed
//! handler.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
