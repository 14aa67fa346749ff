//! Typed views over `data.object` for the payload shapes the service handles.
//!
//! Each view captures only what the handlers read. Unknown fields are ignored
//! and every field is optional, so `{}` decodes to an empty view.

use serde::Deserialize;

/// `charge.dispute.*` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Dispute {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// `customer.source.expiring` payload (a card or other payment source).
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub exp_month: Option<u32>,
    #[serde(default)]
    pub exp_year: Option<u32>,
}

/// `invoice.*` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount_due: Option<i64>,
    #[serde(default)]
    pub attempt_count: Option<u32>,
}

/// `mandate.updated` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct Mandate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// `payment_intent.*` payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payment_intent_ignores_unknown_fields() {
        let pi: PaymentIntent = serde_json::from_value(json!({
            "id": "pi_123",
            "object": "payment_intent",
            "status": "succeeded",
            "amount": 2000,
            "currency": "usd",
            "metadata": { "order": "42" }
        }))
        .unwrap();

        assert_eq!(pi.id.as_deref(), Some("pi_123"));
        assert_eq!(pi.status.as_deref(), Some("succeeded"));
        assert_eq!(pi.amount, Some(2000));
    }

    #[test]
    fn empty_object_decodes_to_empty_view() {
        let dispute: Dispute = serde_json::from_value(json!({})).unwrap();
        assert!(dispute.id.is_none());

        let invoice: Invoice = serde_json::from_value(json!({ "status": "open" })).unwrap();
        assert!(invoice.id.is_none());
        assert_eq!(invoice.status.as_deref(), Some("open"));
    }

    #[test]
    fn wrongly_typed_field_is_rejected() {
        assert!(serde_json::from_value::<PaymentIntent>(json!({ "amount": "lots" })).is_err());
        assert!(serde_json::from_value::<Mandate>(json!("mandate_1")).is_err());
    }

    #[test]
    fn optional_fields_default_to_none() {
        let mandate: Mandate = serde_json::from_value(json!({ "id": "mandate_1" })).unwrap();

        assert_eq!(mandate.id.as_deref(), Some("mandate_1"));
        assert!(mandate.status.is_none());
        assert!(mandate.payment_method.is_none());
    }
}
