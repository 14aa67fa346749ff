//! Business handlers for the payment event categories the service acts on.
//!
//! Each handler owns one payload shape. They decode `data.object`, log what
//! arrived and return; the actual business actions plug in here.
//!
//! A payload that does not fit the view is logged at `warn` and acknowledged.

mod dispute;
mod invoice;
mod mandate;
mod payment_intent;
mod source_expiring;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::domain::webhook::{HandlerRegistry, RegistryError, WebhookEvent};

pub use dispute::DisputeHandler;
pub use invoice::InvoiceHandler;
pub use mandate::MandateHandler;
pub use payment_intent::PaymentIntentHandler;
pub use source_expiring::SourceExpiringHandler;

/// Registry binding every recognized category to its handler.
pub fn payment_event_registry() -> Result<HandlerRegistry, RegistryError> {
    HandlerRegistry::builder()
        .register(Arc::new(DisputeHandler))
        .register(Arc::new(SourceExpiringHandler))
        .register(Arc::new(InvoiceHandler))
        .register(Arc::new(MandateHandler))
        .register(Arc::new(PaymentIntentHandler))
        .build()
}

/// Decode `data.object` as `T`, or log the mismatch and return `None`.
fn decode_object<T: DeserializeOwned>(handler: &'static str, event: &WebhookEvent) -> Option<T> {
    match event.deserialize_object() {
        Ok(view) => Some(view),
        Err(err) => {
            warn!(
                event_id = %event.id(),
                event_type = %event.event_type(),
                handler,
                error = %err,
                "Unexpected payload shape; acknowledging without action"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhook::{
        Dispatch, EventCategory, PaymentIntent, WebhookDispatcher, WebhookEventBuilder,
    };
    use serde_json::json;

    #[test]
    fn registry_binds_every_recognized_category() {
        let registry = payment_event_registry().unwrap();

        let mut expected = EventCategory::RECOGNIZED.to_vec();
        expected.sort_by_key(|c| c.as_str());
        assert_eq!(registry.categories(), expected);
    }

    #[tokio::test]
    async fn each_category_reaches_its_handler() {
        let registry = payment_event_registry().unwrap();
        let cases = [
            ("charge.dispute.created", "dispute"),
            ("customer.source.expiring", "source_expiring"),
            ("invoice.payment_succeeded", "invoice"),
            ("mandate.updated", "mandate"),
            ("payment_intent.processing", "payment_intent"),
        ];

        for (event_type, handler) in cases {
            let event = WebhookEventBuilder::new()
                .event_type(event_type)
                .object(json!({ "id": "obj_1" }))
                .build();

            assert_eq!(
                registry.dispatch(&event).await,
                Ok(Dispatch::Handled { handler }),
                "{}",
                event_type
            );
        }
    }

    #[tokio::test]
    async fn every_category_accepts_an_empty_object() {
        let registry = payment_event_registry().unwrap();

        for category in EventCategory::RECOGNIZED {
            let event = WebhookEventBuilder::new()
                .event_type(category.as_str())
                .object(json!({}))
                .build();

            assert!(
                matches!(registry.dispatch(&event).await, Ok(Dispatch::Handled { .. })),
                "{}",
                category
            );
        }
    }

    #[test]
    fn decode_object_returns_none_on_mismatch() {
        let event = WebhookEventBuilder::new()
            .object(json!({ "amount": "not a number" }))
            .build();

        assert!(decode_object::<PaymentIntent>("payment_intent", &event).is_none());
    }

    #[tokio::test]
    async fn unrecognized_category_is_unhandled() {
        let registry = payment_event_registry().unwrap();
        let event = WebhookEventBuilder::new()
            .event_type("checkout.session.completed")
            .build();

        assert_eq!(registry.dispatch(&event).await, Ok(Dispatch::Unhandled));
    }
}
