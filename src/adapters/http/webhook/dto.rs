//! Data Transfer Objects for the webhook endpoint.
//!
//! Bodies mirror what Stripe integrations conventionally return, so a
//! delivery log in the Stripe dashboard reads the same as elsewhere.

use serde::{Deserialize, Serialize};

/// Body for a 2xx acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    /// `success` or `skipped`.
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WebhookAckResponse {
    /// Event was new and fully processed.
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: None,
        }
    }

    /// Event id was already processed.
    pub fn skipped() -> Self {
        Self {
            status: "skipped".to_string(),
            message: Some("Duplicate event".to_string()),
        }
    }
}

/// Body for a rejected delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short message naming the error category.
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Body for `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_serializes_without_message() {
        let json = serde_json::to_value(WebhookAckResponse::success()).unwrap();
        assert_eq!(json, json!({ "status": "success" }));
    }

    #[test]
    fn skipped_serializes_with_message() {
        let json = serde_json::to_value(WebhookAckResponse::skipped()).unwrap();
        assert_eq!(
            json,
            json!({ "status": "skipped", "message": "Duplicate event" })
        );
    }

    #[test]
    fn error_serializes_as_single_field() {
        let json = serde_json::to_value(ErrorResponse::new("No signature provided")).unwrap();
        assert_eq!(json, json!({ "error": "No signature provided" }));
    }
}
