//! HTTP adapter for Stripe webhook intake.
//!
//! - `POST /webhook` - Authenticated, idempotent webhook intake
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ErrorResponse, HealthResponse, WebhookAckResponse};
pub use handlers::{outcome_response, WebhookAppState, STRIPE_SIGNATURE_HEADER};
pub use routes::{webhook_router, webhook_routes};
