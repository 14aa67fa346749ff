//! PaymentIntentHandler - `payment_intent.succeeded`, `payment_intent.processing`,
//! `payment_intent.payment_failed`.

use async_trait::async_trait;
use tracing::{info, warn};

use super::decode_object;
use crate::domain::webhook::{
    EventCategory, HandlerError, PaymentIntent, WebhookEvent, WebhookEventHandler,
};

const NAME: &str = "payment_intent";

#[derive(Debug, Default, Clone, Copy)]
pub struct PaymentIntentHandler;

#[async_trait]
impl WebhookEventHandler for PaymentIntentHandler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn handles(&self) -> &'static [EventCategory] {
        &[
            EventCategory::PaymentIntentPaymentFailed,
            EventCategory::PaymentIntentProcessing,
            EventCategory::PaymentIntentSucceeded,
        ]
    }

    async fn handle(&self, event: &WebhookEvent) -> Result<(), HandlerError> {
        let Some(intent) = decode_object::<PaymentIntent>(NAME, event) else {
            return Ok(());
        };

        if event.category() == EventCategory::PaymentIntentPaymentFailed {
            warn!(
                event_id = %event.id(),
                event_type = %event.event_type(),
                payment_intent_id = ?intent.id,
                customer = ?intent.customer,
                "Handling payment intent event"
            );
        } else {
            info!(
                event_id = %event.id(),
                event_type = %event.event_type(),
                payment_intent_id = ?intent.id,
                status = ?intent.status,
                amount = ?intent.amount,
                currency = ?intent.currency,
                "Handling payment intent event"
            );
        }

        Ok(())
    }
}
