//! Axum router configuration for the webhook endpoint.

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{health, receive_webhook, WebhookAppState};

/// Create the webhook routes.
///
/// # Routes
/// - `POST /webhook` - Receive Stripe webhooks (no auth, signature verified)
/// - `GET /health` - Liveness probe
pub fn webhook_routes() -> Router<WebhookAppState> {
    Router::new()
        .route("/webhook", post(receive_webhook))
        .route("/health", get(health))
}

/// Create the complete service router with tracing and a request timeout.
///
/// # Example
///
/// ```ignore
/// let state = WebhookAppState::new(intake);
/// let app = webhook_router(state, Duration::from_secs(30));
/// axum::serve(listener, app).await?;
/// ```
pub fn webhook_router(state: WebhookAppState, request_timeout: Duration) -> Router {
    webhook_routes()
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
