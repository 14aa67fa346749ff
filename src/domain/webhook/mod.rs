//! Webhook domain - Verification, event model and dispatch for Stripe webhooks.
//!
//! # Module Organization
//!
//! - `event` - Verified event envelope and the closed category set
//! - `objects` - Typed views over `data.object`
//! - `verifier` - Stripe-Signature HMAC verification with replay window
//! - `dispatcher` - Handler traits and the static category registry
//! - `errors` - Verification, handler and intake error types

mod dispatcher;
mod errors;
mod event;
mod objects;
mod verifier;

pub use dispatcher::{
    Dispatch, HandlerRegistry, HandlerRegistryBuilder, RegistryError, WebhookDispatcher,
    WebhookEventHandler,
};
pub use errors::{HandlerError, SignatureFailure, VerificationError, WebhookError};
pub use event::{EventCategory, EventData, WebhookEvent};
pub use objects::{Dispute, Invoice, Mandate, PaymentIntent, PaymentSource};
pub use verifier::{
    sign_payload, signature_header, SignatureHeader, WebhookVerifier, DEFAULT_TOLERANCE_SECS,
};

#[cfg(test)]
pub(crate) use event::WebhookEventBuilder;
