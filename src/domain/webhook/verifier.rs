//! Stripe webhook signature verification.
//!
//! Implements secure verification of Stripe webhook signatures using HMAC-SHA256.
//! Includes timestamp validation to prevent replay attacks.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::domain::foundation::Timestamp;

use super::errors::{SignatureFailure, VerificationError};
use super::event::WebhookEvent;

type HmacSha256 = Hmac<Sha256>;

/// Default replay window (5 minutes), matching Stripe's client libraries.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Parsed components from the Stripe-Signature header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Unix timestamp when the signature was generated.
    pub timestamp: i64,
    /// Every `v1` signature, lowercase hex as sent. More than one appears
    /// while a signing secret is being rolled.
    pub v1_signatures: Vec<String>,
}

impl SignatureHeader {
    /// Parses a Stripe-Signature header string.
    ///
    /// Format: `t=<timestamp>,v1=<signature>[,v1=<signature>...][,v0=<legacy>]`
    ///
    /// `v0` and unknown schemes are ignored.
    pub fn parse(header: &str) -> Result<Self, SignatureFailure> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let (key, value) = part
                .split_once('=')
                .ok_or(SignatureFailure::MalformedHeader("expected key=value pairs"))?;

            match key {
                "t" => {
                    timestamp = Some(
                        value
                            .parse()
                            .map_err(|_| SignatureFailure::MalformedHeader("invalid timestamp"))?,
                    );
                }
                "v1" => v1_signatures.push(value.to_string()),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(SignatureFailure::MalformedHeader("missing timestamp"))?;
        if v1_signatures.is_empty() {
            return Err(SignatureFailure::MalformedHeader("missing v1 signature"));
        }

        Ok(SignatureHeader {
            timestamp,
            v1_signatures,
        })
    }
}

/// Verifier for Stripe webhook signatures.
#[derive(Debug)]
pub struct WebhookVerifier {
    /// The webhook signing secret from the Stripe dashboard.
    secret: SecretString,
    tolerance_secs: i64,
}

impl WebhookVerifier {
    /// Creates a new verifier with the given webhook secret and the default
    /// tolerance.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: SecretString::new(secret.into()),
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
        }
    }

    /// Overrides the replay window.
    pub fn with_tolerance_secs(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    pub fn tolerance_secs(&self) -> i64 {
        self.tolerance_secs
    }

    /// Verifies the webhook signature against the current time and parses
    /// the event.
    pub fn verify(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<WebhookEvent, VerificationError> {
        self.verify_at(payload, signature_header, Timestamp::now())
    }

    /// Verifies the webhook signature as of `now` and parses the event.
    ///
    /// # Verification Steps
    ///
    /// 1. Reject a blank header
    /// 2. Parse the signature header
    /// 3. Validate timestamp is within tolerance of `now`
    /// 4. Compare every `v1` entry against the expected HMAC (constant-time)
    /// 5. Parse the JSON payload into a WebhookEvent
    ///
    /// # Errors
    ///
    /// - `MissingSignature` - header is empty or whitespace
    /// - `InvalidSignature` - any other failure; the reason is attached for logging
    pub fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: Timestamp,
    ) -> Result<WebhookEvent, VerificationError> {
        if signature_header.trim().is_empty() {
            return Err(VerificationError::MissingSignature);
        }

        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp, now)?;

        let expected = compute_signature(
            self.secret.expose_secret().as_bytes(),
            header.timestamp,
            payload,
        );
        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(expected.as_bytes(), candidate.as_bytes()));
        if !matched {
            return Err(SignatureFailure::Mismatch.into());
        }

        let event: WebhookEvent = serde_json::from_slice(payload)
            .map_err(|e| SignatureFailure::MalformedPayload(e.to_string()))?;
        event
            .validate()
            .map_err(|reason| SignatureFailure::MalformedPayload(reason.to_string()))?;

        Ok(event)
    }

    /// Validates that the timestamp is within the tolerance window.
    fn validate_timestamp(&self, timestamp: i64, now: Timestamp) -> Result<(), SignatureFailure> {
        let age = now.as_unix_secs().saturating_sub(timestamp);

        if age > self.tolerance_secs {
            return Err(SignatureFailure::TimestampTooOld);
        }
        if age < -self.tolerance_secs {
            return Err(SignatureFailure::TimestampInFuture);
        }

        Ok(())
    }
}

/// Computes the lowercase hex HMAC-SHA256 over `"<timestamp>." ++ payload`.
fn compute_signature(secret: &[u8], timestamp: i64, payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Performs constant-time comparison of two byte slices.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Signs a payload the way Stripe does, returning the `v1` hex signature.
///
/// Used for local replay tooling and tests.
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    compute_signature(secret.as_bytes(), timestamp, payload)
}

/// Builds a complete `Stripe-Signature` header value for a payload.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!("t={},v1={}", timestamp, sign_payload(secret, timestamp, payload))
}
