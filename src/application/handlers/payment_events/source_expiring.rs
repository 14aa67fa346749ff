//! SourceExpiringHandler - `customer.source.expiring`.

use async_trait::async_trait;
use tracing::info;

use super::decode_object;
use crate::domain::webhook::{
    EventCategory, HandlerError, PaymentSource, WebhookEvent, WebhookEventHandler,
};

const NAME: &str = "source_expiring";

/// Notes payment sources about to expire.
#[derive(Debug, Default, Clone, Copy)]
pub struct SourceExpiringHandler;

#[async_trait]
impl WebhookEventHandler for SourceExpiringHandler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn handles(&self) -> &'static [EventCategory] {
        &[EventCategory::CustomerSourceExpiring]
    }

    async fn handle(&self, event: &WebhookEvent) -> Result<(), HandlerError> {
        let Some(source) = decode_object::<PaymentSource>(NAME, event) else {
            return Ok(());
        };

        info!(
            event_id = %event.id(),
            source_id = ?source.id,
            customer = ?source.customer,
            exp_month = ?source.exp_month,
            exp_year = ?source.exp_year,
            "Handling source expiring event"
        );

        Ok(())
    }
}
