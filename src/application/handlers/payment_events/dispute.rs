//! DisputeHandler - `charge.dispute.created` and `charge.dispute.closed`.

use async_trait::async_trait;
use tracing::info;

use super::decode_object;
use crate::domain::webhook::{Dispute, EventCategory, HandlerError, WebhookEvent, WebhookEventHandler};

const NAME: &str = "dispute";

/// Records dispute lifecycle events.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisputeHandler;

#[async_trait]
impl WebhookEventHandler for DisputeHandler {
    fn name(&self) -> &'static str {
        NAME
    }

    fn handles(&self) -> &'static [EventCategory] {
        &[
            EventCategory::ChargeDisputeClosed,
            EventCategory::ChargeDisputeCreated,
        ]
    }

    async fn handle(&self, event: &WebhookEvent) -> Result<(), HandlerError> {
        let Some(dispute) = decode_object::<Dispute>(NAME, event) else {
            return Ok(());
        };

        info!(
            event_id = %event.id(),
            event_type = %event.event_type(),
            dispute_id = ?dispute.id,
            amount = ?dispute.amount,
            currency = ?dispute.currency,
            reason = ?dispute.reason,
            status = ?dispute.status,
            "Handling dispute event"
        );

        Ok(())
    }
}
