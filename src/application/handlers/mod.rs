//! Command handlers.

pub mod intake_webhook;
pub mod payment_events;

pub use intake_webhook::{
    IntakeOutcome, IntakeStatus, IntakeWebhookCommand, IntakeWebhookHandler,
};
pub use payment_events::{
    payment_event_registry, DisputeHandler, InvoiceHandler, MandateHandler, PaymentIntentHandler,
    SourceExpiringHandler,
};
