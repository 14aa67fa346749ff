//! MandateHandler - `mandate.updated`.

use async_trait::async_trait;
use tracing::info;

use super::decode_object;
use crate::domain::webhook::{EventCategory, HandlerError, Mandate, WebhookEvent, WebhookEventHandler};

const NAME: &str = "mandate";

#[derive(Debug, Default, Clone, Copy)]
pub struct MandateHandler;

#[async_trait]
impl WebhookEventHandler for MandateHandler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn handles(&self) -> &'static [EventCategory] {
        &[EventCategory::MandateUpdated]
    }

    async fn handle(&self, event: &WebhookEvent) -> Result<(), HandlerError> {
        let Some(mandate) = decode_object::<Mandate>(NAME, event) else {
            return Ok(());
        };

        info!(
            event_id = %event.id(),
            mandate_id = ?mandate.id,
            status = ?mandate.status,
            payment_method = ?mandate.payment_method,
            "Handling mandate event"
        );

        Ok(())
    }
}
