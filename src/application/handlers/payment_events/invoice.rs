//! InvoiceHandler - `invoice.created`, `invoice.payment_failed`,
//! `invoice.payment_succeeded`.
//!
//! One payload shape, three categories; the raw event type tells them apart.

use async_trait::async_trait;
use tracing::{info, warn};

use super::decode_object;
use crate::domain::webhook::{EventCategory, HandlerError, Invoice, WebhookEvent, WebhookEventHandler};

const NAME: &str = "invoice";

#[derive(Debug, Default, Clone, Copy)]
pub struct InvoiceHandler;

#[async_trait]
impl WebhookEventHandler for InvoiceHandler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn handles(&self) -> &'static [EventCategory] {
        &[
            EventCategory::InvoiceCreated,
            EventCategory::InvoicePaymentFailed,
            EventCategory::InvoicePaymentSucceeded,
        ]
    }

    async fn handle(&self, event: &WebhookEvent) -> Result<(), HandlerError> {
        let Some(invoice) = decode_object::<Invoice>(NAME, event) else {
            return Ok(());
        };

        match event.category() {
            EventCategory::InvoicePaymentFailed => warn!(
                event_id = %event.id(),
                event_type = %event.event_type(),
                invoice_id = ?invoice.id,
                customer = ?invoice.customer,
                attempt_count = ?invoice.attempt_count,
                "Handling invoice event"
            ),
            _ => info!(
                event_id = %event.id(),
                event_type = %event.event_type(),
                invoice_id = ?invoice.id,
                customer = ?invoice.customer,
                status = ?invoice.status,
                amount_due = ?invoice.amount_due,
                "Handling invoice event"
            ),
        }

        Ok(())
    }
}
