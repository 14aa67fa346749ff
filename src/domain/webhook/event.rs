//! Stripe webhook event types.
//!
//! Defines the structures for parsing Stripe webhook payloads.
//! Only fields relevant to intake and dispatch are captured.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A verified Stripe webhook event.
///
/// Fields are private: a `WebhookEvent` only comes out of
/// [`WebhookVerifier`](super::WebhookVerifier), and nothing mutates it
/// afterwards. Handlers receive it by shared reference.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebhookEvent {
    id: String,

    #[serde(rename = "type")]
    event_type: String,

    #[serde(default)]
    created: Option<i64>,

    data: EventData,

    #[serde(default)]
    livemode: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,

    /// Previous values for updated attributes (only for update events).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

impl WebhookEvent {
    /// Provider-assigned event identifier (`evt_...`). The deduplication key.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw category string, e.g. `invoice.payment_failed`.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Parse the category string into the closed [`EventCategory`] set.
    pub fn category(&self) -> EventCategory {
        EventCategory::from_type(&self.event_type)
    }

    /// Unix time the provider created the event, when present.
    pub fn created(&self) -> Option<i64> {
        self.created
    }

    /// Returns true if this is a live mode event.
    pub fn is_live(&self) -> bool {
        self.livemode
    }

    pub fn api_version(&self) -> Option<&str> {
        self.api_version.as_deref()
    }

    /// The `data.object` payload.
    pub fn object(&self) -> &serde_json::Value {
        &self.data.object
    }

    pub fn previous_attributes(&self) -> Option<&serde_json::Value> {
        self.data.previous_attributes.as_ref()
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.object)
    }

    /// Checks the structural requirements the intake pipeline relies on.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.id.trim().is_empty() {
            return Err("event id is empty");
        }
        if self.event_type.trim().is_empty() {
            return Err("event type is empty");
        }
        Ok(())
    }
}

/// Event categories the service acts on.
///
/// Anything the provider sends outside this set parses to `Unhandled`, which
/// is a valid category: it is verified, deduplicated and marked processed,
/// but nothing is dispatched for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    ChargeDisputeClosed,
    ChargeDisputeCreated,
    CustomerSourceExpiring,
    InvoiceCreated,
    InvoicePaymentFailed,
    InvoicePaymentSucceeded,
    MandateUpdated,
    PaymentIntentPaymentFailed,
    PaymentIntentProcessing,
    PaymentIntentSucceeded,
    Unhandled,
}

impl EventCategory {
    /// Every category with a business meaning, in provider order.
    pub const RECOGNIZED: [EventCategory; 10] = [
        Self::ChargeDisputeClosed,
        Self::ChargeDisputeCreated,
        Self::CustomerSourceExpiring,
        Self::InvoiceCreated,
        Self::InvoicePaymentFailed,
        Self::InvoicePaymentSucceeded,
        Self::MandateUpdated,
        Self::PaymentIntentPaymentFailed,
        Self::PaymentIntentProcessing,
        Self::PaymentIntentSucceeded,
    ];

    /// Parse a provider event type string.
    pub fn from_type(s: &str) -> Self {
        match s {
            "charge.dispute.closed" => Self::ChargeDisputeClosed,
            "charge.dispute.created" => Self::ChargeDisputeCreated,
            "customer.source.expiring" => Self::CustomerSourceExpiring,
            "invoice.created" => Self::InvoiceCreated,
            "invoice.payment_failed" => Self::InvoicePaymentFailed,
            "invoice.payment_succeeded" => Self::InvoicePaymentSucceeded,
            "mandate.updated" => Self::MandateUpdated,
            "payment_intent.payment_failed" => Self::PaymentIntentPaymentFailed,
            "payment_intent.processing" => Self::PaymentIntentProcessing,
            "payment_intent.succeeded" => Self::PaymentIntentSucceeded,
            _ => Self::Unhandled,
        }
    }

    /// Convert to the provider event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChargeDisputeClosed => "charge.dispute.closed",
            Self::ChargeDisputeCreated => "charge.dispute.created",
            Self::CustomerSourceExpiring => "customer.source.expiring",
            Self::InvoiceCreated => "invoice.created",
            Self::InvoicePaymentFailed => "invoice.payment_failed",
            Self::InvoicePaymentSucceeded => "invoice.payment_succeeded",
            Self::MandateUpdated => "mandate.updated",
            Self::PaymentIntentPaymentFailed => "payment_intent.payment_failed",
            Self::PaymentIntentProcessing => "payment_intent.processing",
            Self::PaymentIntentSucceeded => "payment_intent.succeeded",
            Self::Unhandled => "unhandled",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unhandled)
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builder for creating test WebhookEvent instances.
#[cfg(test)]
pub struct WebhookEventBuilder {
    id: String,
    event_type: String,
    object: serde_json::Value,
    livemode: bool,
}

#[cfg(test)]
impl Default for WebhookEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "payment_intent.succeeded".to_string(),
            object: serde_json::json!({ "id": "pi_test_123" }),
            livemode: false,
        }
    }
}

#[cfg(test)]
impl WebhookEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn livemode(mut self, livemode: bool) -> Self {
        self.livemode = livemode;
        self
    }

    pub fn build(self) -> WebhookEvent {
        WebhookEvent {
            id: self.id,
            event_type: self.event_type,
            created: Some(chrono::Utc::now().timestamp()),
            data: EventData {
                object: self.object,
                previous_attributes: None,
            },
            livemode: self.livemode,
            api_version: Some("2023-10-16".to_string()),
        }
    }
}
