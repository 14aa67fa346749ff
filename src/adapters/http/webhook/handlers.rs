//! HTTP handlers for the webhook endpoint.
//!
//! These handlers connect Axum routes to the intake pipeline.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::{
    IntakeOutcome, IntakeStatus, IntakeWebhookCommand, IntakeWebhookHandler,
};

use super::dto::{ErrorResponse, HealthResponse, WebhookAckResponse};

/// Header carrying Stripe's signature.
pub const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state.
///
/// Cloned per request; the pipeline behind the `Arc` is stateless.
#[derive(Clone)]
pub struct WebhookAppState {
    pub intake: Arc<IntakeWebhookHandler>,
}

impl WebhookAppState {
    pub fn new(intake: IntakeWebhookHandler) -> Self {
        Self {
            intake: Arc::new(intake),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /webhook - Receive a Stripe webhook delivery.
///
/// The body is taken as raw bytes; it must not be re-serialized before the
/// signature check.
pub async fn receive_webhook(
    State(state): State<WebhookAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    // Non-UTF-8 bytes survive lossily and then fail verification.
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());

    let cmd = IntakeWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    let outcome = state.intake.handle(cmd).await;
    outcome_response(&outcome)
}

/// GET /health - Liveness probe.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Maps an intake outcome to status code and body.
///
/// Stripe treats any non-2xx as "redeliver later"; 5xx is used for the
/// outcomes where redelivery can help.
pub fn outcome_response(outcome: &IntakeOutcome) -> Response {
    match outcome.status() {
        IntakeStatus::OkProcessed => (StatusCode::OK, Json(WebhookAckResponse::success())).into_response(),
        IntakeStatus::OkDuplicate => (StatusCode::OK, Json(WebhookAckResponse::skipped())).into_response(),
        IntakeStatus::ClientError => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(outcome.message())),
        )
            .into_response(),
        IntakeStatus::ServerError => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(outcome.message())),
        )
            .into_response(),
    }
}
