//! Webhook error types for Stripe webhook intake.
//!
//! Defines all error conditions that can occur between receiving a raw
//! delivery and acknowledging it, with retryability semantics and the short
//! caller-facing message for each.

use thiserror::Error;

use crate::ports::IdempotencyStoreError;

/// Precise reason a signature check failed.
///
/// Only ever logged. Callers see [`VerificationError::InvalidSignature`]
/// whatever the reason, so a probe learns nothing about which part was wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureFailure {
    #[error("malformed signature header: {0}")]
    MalformedHeader(&'static str),

    #[error("no v1 signature matches the payload")]
    Mismatch,

    #[error("timestamp is older than the tolerance window")]
    TimestampTooOld,

    #[error("timestamp is further in the future than the tolerance window")]
    TimestampInFuture,

    #[error("signed payload is not a valid event: {0}")]
    MalformedPayload(String),
}

/// Errors produced by signature verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// Signature header absent or blank.
    #[error("No signature provided")]
    MissingSignature,

    /// Bad secret, tampered payload, stale timestamp or malformed header.
    #[error("Invalid signature")]
    InvalidSignature(SignatureFailure),
}

impl VerificationError {
    /// The underlying reason, for logging.
    pub fn failure(&self) -> Option<&SignatureFailure> {
        match self {
            VerificationError::MissingSignature => None,
            VerificationError::InvalidSignature(failure) => Some(failure),
        }
    }
}

impl From<SignatureFailure> for VerificationError {
    fn from(failure: SignatureFailure) -> Self {
        VerificationError::InvalidSignature(failure)
    }
}

/// Business-logic failure inside a dispatched handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{handler}: {message}")]
pub struct HandlerError {
    handler: &'static str,
    message: String,
}

impl HandlerError {
    pub fn failed(handler: &'static str, message: impl Into<String>) -> Self {
        Self {
            handler,
            message: message.into(),
        }
    }

    /// Name of the handler that failed.
    pub fn handler(&self) -> &'static str {
        self.handler
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Every way an intake can be rejected.
///
/// The `Display` output is deliberately short: it names the error category
/// and never carries backend or handler detail.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// The idempotency store could not answer `exists` or accept a write.
    #[error("Idempotency store unavailable")]
    StoreUnavailable(#[from] IdempotencyStoreError),

    /// A dispatched handler failed; the event was not marked processed.
    #[error("Handler failed")]
    Handler(#[from] HandlerError),
}

impl WebhookError {
    /// Returns true if Stripe should retry delivering this webhook.
    ///
    /// Verification failures never get better on redelivery. Store outages
    /// and handler failures might, and the event was not marked processed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WebhookError::StoreUnavailable(_) | WebhookError::Handler(_)
        )
    }

    /// Message returned to the caller.
    pub fn public_message(&self) -> String {
        match self {
            WebhookError::Verification(VerificationError::MissingSignature) => {
                VerificationError::MissingSignature.to_string()
            }
            other => format!("Webhook Error: {}", other),
        }
    }
}
