//! IntakeWebhookHandler - Authenticated, idempotent intake of Stripe webhooks.
//!
//! Every delivery walks the same straight line:
//!
//! 1. Require a signature header
//! 2. Verify signature and timestamp, parse the event
//! 3. Skip if the event id already has a tombstone
//! 4. Dispatch to the handler bound to the event category
//! 5. Write the tombstone
//!
//! The tombstone is written only after dispatch succeeds. A crash between
//! steps 4 and 5 means the handler runs again on redelivery; a handler is
//! never skipped because its event was marked too early.
//!
//! `exists` and `mark_processed` are not atomic together. Two concurrent
//! deliveries of one id can both dispatch.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::foundation::Timestamp;
use crate::domain::webhook::{
    Dispatch, VerificationError, WebhookDispatcher, WebhookError, WebhookEvent, WebhookVerifier,
};
use crate::ports::{IdempotencyStore, ProcessedRecord, DEFAULT_RECORD_TTL_SECS};

/// Command carrying one raw webhook delivery.
#[derive(Debug, Clone)]
pub struct IntakeWebhookCommand {
    /// Raw request body, byte-exact.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value, if the request had one.
    pub signature: Option<String>,
}

/// Classification the transport maps to a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStatus {
    OkProcessed,
    OkDuplicate,
    ClientError,
    ServerError,
}

/// Result of one intake. Every path ends in one of these.
#[derive(Debug)]
pub enum IntakeOutcome {
    /// New event, dispatched and marked processed.
    Processed { event_id: String, dispatch: Dispatch },
    /// Event id already had a tombstone; nothing ran.
    Duplicate { event_id: String },
    /// Intake stopped early.
    Rejected(WebhookError),
}

impl IntakeOutcome {
    pub fn status(&self) -> IntakeStatus {
        match self {
            IntakeOutcome::Processed { .. } => IntakeStatus::OkProcessed,
            IntakeOutcome::Duplicate { .. } => IntakeStatus::OkDuplicate,
            IntakeOutcome::Rejected(err) if err.is_retryable() => IntakeStatus::ServerError,
            IntakeOutcome::Rejected(_) => IntakeStatus::ClientError,
        }
    }

    /// Short human-readable message. Never carries internal error detail.
    pub fn message(&self) -> String {
        match self {
            IntakeOutcome::Processed { .. } => "Event processed".to_string(),
            IntakeOutcome::Duplicate { .. } => "Duplicate event".to_string(),
            IntakeOutcome::Rejected(err) => err.public_message(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, IntakeOutcome::Rejected(_))
    }
}

/// Handler for the webhook intake pipeline.
///
/// Holds no mutable state; one instance serves all requests concurrently.
pub struct IntakeWebhookHandler {
    verifier: Arc<WebhookVerifier>,
    store: Arc<dyn IdempotencyStore>,
    dispatcher: Arc<dyn WebhookDispatcher>,
    record_ttl_secs: u64,
}

impl IntakeWebhookHandler {
    pub fn new(
        verifier: Arc<WebhookVerifier>,
        store: Arc<dyn IdempotencyStore>,
        dispatcher: Arc<dyn WebhookDispatcher>,
    ) -> Self {
        Self {
            verifier,
            store,
            dispatcher,
            record_ttl_secs: DEFAULT_RECORD_TTL_SECS,
        }
    }

    /// Lifetime of tombstones written by this handler.
    pub fn with_record_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.record_ttl_secs = ttl_secs;
        self
    }

    pub async fn handle(&self, cmd: IntakeWebhookCommand) -> IntakeOutcome {
        match self.process(cmd).await {
            Ok(outcome) => outcome,
            Err(err) => IntakeOutcome::Rejected(err),
        }
    }

    async fn process(&self, cmd: IntakeWebhookCommand) -> Result<IntakeOutcome, WebhookError> {
        // 1. Signature header must be present before anything else runs
        let signature = match cmd.signature.as_deref() {
            Some(header) if !header.trim().is_empty() => header,
            _ => {
                warn!("Rejected webhook: no signature header");
                return Err(VerificationError::MissingSignature.into());
            }
        };

        // 2. Verify and parse
        let event = self.verifier.verify(&cmd.payload, signature).map_err(|err| {
            let reason = err
                .failure()
                .map(|failure| failure.to_string())
                .unwrap_or_default();
            warn!(reason = %reason, "Rejected webhook: {}", err);
            err
        })?;

        debug!(
            event_id = %event.id(),
            event_type = %event.event_type(),
            livemode = event.is_live(),
            "Verified webhook signature"
        );

        // 3. Deduplicate on event id
        let seen = self.store.exists(event.id()).await.map_err(|err| {
            error!(event_id = %event.id(), error = %err, "Idempotency check failed");
            err
        })?;
        if seen {
            info!(
                event_id = %event.id(),
                event_type = %event.event_type(),
                "Skipping duplicate webhook event"
            );
            return Ok(IntakeOutcome::Duplicate {
                event_id: event.id().to_string(),
            });
        }

        // 4. Dispatch
        let dispatch = self.dispatch(&event).await?;

        // 5. Tombstone, only after the handler succeeded
        let record = ProcessedRecord::new(event.id(), Timestamp::now(), self.record_ttl_secs);
        self.store.mark_processed(&record).await.map_err(|err| {
            error!(event_id = %event.id(), error = %err, "Failed to mark webhook event processed");
            err
        })?;

        info!(
            event_id = %event.id(),
            event_type = %event.event_type(),
            handled = matches!(dispatch, Dispatch::Handled { .. }),
            "Processed webhook event"
        );

        Ok(IntakeOutcome::Processed {
            event_id: record.id,
            dispatch,
        })
    }

    async fn dispatch(&self, event: &WebhookEvent) -> Result<Dispatch, WebhookError> {
        match self.dispatcher.dispatch(event).await {
            Ok(Dispatch::Unhandled) => {
                debug!(
                    event_id = %event.id(),
                    event_type = %event.event_type(),
                    "No handler bound for event category"
                );
                Ok(Dispatch::Unhandled)
            }
            Ok(handled) => Ok(handled),
            Err(err) => {
                error!(
                    event_id = %event.id(),
                    event_type = %event.event_type(),
                    handler = err.handler(),
                    error = %err,
                    "Webhook handler failed; event left unmarked for redelivery"
                );
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::idempotency::InMemoryIdempotencyStore;
    use crate::domain::webhook::{
        signature_header, EventCategory, HandlerError, HandlerRegistry, WebhookEventHandler,
    };
    use crate::ports::IdempotencyStoreError;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    const SECRET: &str = "whsec_test_secret";

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    #[derive(Default)]
    struct MockStore {
        existing: Mutex<HashSet<String>>,
        writes: Mutex<Vec<ProcessedRecord>>,
        exists_calls: AtomicU32,
        fail_exists: bool,
        fail_mark: bool,
    }

    impl MockStore {
        fn with_existing(id: &str) -> Self {
            let store = Self::default();
            store.existing.lock().unwrap().insert(id.to_string());
            store
        }

        fn failing_exists() -> Self {
            Self {
                fail_exists: true,
                ..Self::default()
            }
        }

        fn failing_mark() -> Self {
            Self {
                fail_mark: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.exists_calls.load(Ordering::SeqCst) as usize + self.writes().len()
        }

        fn writes(&self) -> Vec<ProcessedRecord> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IdempotencyStore for MockStore {
        async fn exists(&self, event_id: &str) -> Result<bool, IdempotencyStoreError> {
            self.exists_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_exists {
                return Err(IdempotencyStoreError::Unavailable("connection reset".into()));
            }
            Ok(self.existing.lock().unwrap().contains(event_id))
        }

        async fn mark_processed(
            &self,
            record: &ProcessedRecord,
        ) -> Result<(), IdempotencyStoreError> {
            if self.fail_mark {
                return Err(IdempotencyStoreError::Unavailable("write timeout".into()));
            }
            self.writes.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    struct CountingHandler {
        calls: AtomicU32,
        fail: bool,
    }

    impl CountingHandler {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail: true,
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WebhookEventHandler for CountingHandler {
        fn name(&self) -> &'static str {
            "payment_intent"
        }

        fn handles(&self) -> &'static [EventCategory] {
            &[EventCategory::PaymentIntentSucceeded]
        }

        async fn handle(&self, _event: &WebhookEvent) -> Result<(), HandlerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(HandlerError::failed("payment_intent", "downstream rejected"));
            }
            Ok(())
        }
    }

    fn pipeline(
        store: Arc<dyn IdempotencyStore>,
        handler: Arc<CountingHandler>,
    ) -> IntakeWebhookHandler {
        let registry = HandlerRegistry::builder().register(handler).build().unwrap();
        IntakeWebhookHandler::new(
            Arc::new(WebhookVerifier::new(SECRET)),
            store,
            Arc::new(registry),
        )
    }

    fn payload(id: &str, event_type: &str) -> Vec<u8> {
        serde_json::json!({
            "id": id,
            "object": "event",
            "type": event_type,
            "data": { "object": { "id": "pi_1", "status": "succeeded" } },
            "livemode": false
        })
        .to_string()
        .into_bytes()
    }

    fn signed(id: &str, event_type: &str) -> IntakeWebhookCommand {
        let payload = payload(id, event_type);
        let signature = signature_header(SECRET, Timestamp::now().as_unix_secs(), &payload);
        IntakeWebhookCommand {
            payload,
            signature: Some(signature),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Signature Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn missing_signature_is_client_error_without_store_calls() {
        let store = Arc::new(MockStore::default());
        let handler = CountingHandler::new();
        let intake = pipeline(store.clone(), handler.clone());

        let outcome = intake
            .handle(IntakeWebhookCommand {
                payload: payload("evt_123", "payment_intent.succeeded"),
                signature: None,
            })
            .await;

        assert_eq!(outcome.status(), IntakeStatus::ClientError);
        assert_eq!(outcome.message(), "No signature provided");
        assert_eq!(store.calls(), 0);
        assert_eq!(handler.calls(), 0);
    }

    #[tokio::test]
    async fn blank_signature_is_treated_as_missing() {
        let store = Arc::new(MockStore::default());
        let intake = pipeline(store.clone(), CountingHandler::new());

        let outcome = intake
            .handle(IntakeWebhookCommand {
                payload: payload("evt_123", "payment_intent.succeeded"),
                signature: Some("  ".to_string()),
            })
            .await;

        assert_eq!(outcome.message(), "No signature provided");
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn invalid_signature_is_client_error_without_store_calls() {
        let store = Arc::new(MockStore::default());
        let intake = pipeline(store.clone(), CountingHandler::new());
        let mut cmd = signed("evt_123", "payment_intent.succeeded");
        cmd.payload.push(b' ');

        let outcome = intake.handle(cmd).await;

        assert_eq!(outcome.status(), IntakeStatus::ClientError);
        assert_eq!(outcome.message(), "Webhook Error: Invalid signature");
        assert_eq!(store.calls(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Idempotency Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn new_event_is_dispatched_then_marked() {
        let store = Arc::new(MockStore::default());
        let handler = CountingHandler::new();
        let intake = pipeline(store.clone(), handler.clone()).with_record_ttl_secs(600);

        let outcome = intake.handle(signed("evt_123", "payment_intent.succeeded")).await;

        assert_eq!(outcome.status(), IntakeStatus::OkProcessed);
        assert!(matches!(
            outcome,
            IntakeOutcome::Processed {
                dispatch: Dispatch::Handled {
                    handler: "payment_intent"
                },
                ..
            }
        ));
        assert_eq!(handler.calls(), 1);

        let writes = store.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].id, "evt_123");
        assert_eq!(writes[0].ttl_secs(), 600);
    }

    #[tokio::test]
    async fn known_event_is_skipped_without_dispatch_or_write() {
        let store = Arc::new(MockStore::with_existing("evt_123"));
        let handler = CountingHandler::new();
        let intake = pipeline(store.clone(), handler.clone());

        let outcome = intake.handle(signed("evt_123", "payment_intent.succeeded")).await;

        assert_eq!(outcome.status(), IntakeStatus::OkDuplicate);
        assert_eq!(outcome.message(), "Duplicate event");
        assert_eq!(handler.calls(), 0);
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn second_delivery_is_duplicate_and_dispatches_once() {
        let store = Arc::new(InMemoryIdempotencyStore::new());
        let handler = CountingHandler::new();
        let intake = pipeline(store, handler.clone());

        let first = intake.handle(signed("evt_twice", "payment_intent.succeeded")).await;
        let second = intake.handle(signed("evt_twice", "payment_intent.succeeded")).await;

        assert_eq!(first.status(), IntakeStatus::OkProcessed);
        assert_eq!(second.status(), IntakeStatus::OkDuplicate);
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test]
    async fn unrecognized_category_is_marked_without_dispatch() {
        let store = Arc::new(MockStore::default());
        let handler = CountingHandler::new();
        let intake = pipeline(store.clone(), handler.clone());

        let outcome = intake.handle(signed("evt_foo", "foo.bar")).await;

        assert!(matches!(
            outcome,
            IntakeOutcome::Processed {
                dispatch: Dispatch::Unhandled,
                ..
            }
        ));
        assert_eq!(handler.calls(), 0);
        assert_eq!(store.writes().len(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn exists_failure_is_server_error_without_dispatch_or_write() {
        let store = Arc::new(MockStore::failing_exists());
        let handler = CountingHandler::new();
        let intake = pipeline(store.clone(), handler.clone());

        let outcome = intake.handle(signed("evt_123", "payment_intent.succeeded")).await;

        assert_eq!(outcome.status(), IntakeStatus::ServerError);
        assert!(outcome.message().contains("Webhook Error"));
        assert!(!outcome.message().contains("connection reset"));
        assert_eq!(handler.calls(), 0);
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn mark_failure_is_server_error() {
        let store = Arc::new(MockStore::failing_mark());
        let handler = CountingHandler::new();
        let intake = pipeline(store.clone(), handler.clone());

        let outcome = intake.handle(signed("evt_123", "payment_intent.succeeded")).await;

        assert_eq!(outcome.status(), IntakeStatus::ServerError);
        assert_eq!(
            outcome.message(),
            "Webhook Error: Idempotency store unavailable"
        );
        assert_eq!(handler.calls(), 1);
    }

    #[tokio::test]
    async fn handler_failure_leaves_event_unmarked() {
        let store = Arc::new(MockStore::default());
        let handler = CountingHandler::failing();
        let intake = pipeline(store.clone(), handler.clone());

        let outcome = intake.handle(signed("evt_123", "payment_intent.succeeded")).await;

        assert_eq!(outcome.status(), IntakeStatus::ServerError);
        assert_eq!(outcome.message(), "Webhook Error: Handler failed");
        assert!(!outcome.is_success());
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn failed_handler_runs_again_on_redelivery() {
        let store = Arc::new(InMemoryIdempotencyStore::new());
        let handler = CountingHandler::failing();
        let intake = pipeline(store.clone(), handler.clone());

        intake.handle(signed("evt_retry", "payment_intent.succeeded")).await;
        intake.handle(signed("evt_retry", "payment_intent.succeeded")).await;

        assert_eq!(handler.calls(), 2);
        assert!(!store.exists("evt_retry").await.unwrap());
    }

    #[tokio::test]
    async fn empty_object_for_recognized_category_is_processed_by_stub_handlers() {
        let store = Arc::new(MockStore::default());
        let registry = crate::application::handlers::payment_event_registry().unwrap();
        let intake = IntakeWebhookHandler::new(
            Arc::new(WebhookVerifier::new(SECRET)),
            store.clone(),
            Arc::new(registry),
        );
        let payload = br#"{"id":"evt_123","type":"payment_intent.succeeded","data":{"object":{}}}"#.to_vec();
        let signature = signature_header(SECRET, Timestamp::now().as_unix_secs(), &payload);

        let outcome = intake
            .handle(IntakeWebhookCommand {
                payload,
                signature: Some(signature),
            })
            .await;

        assert_eq!(outcome.status(), IntakeStatus::OkProcessed);
        assert_eq!(store.writes().len(), 1);
    }

    #[tokio::test]
    async fn oversized_record_ttl_is_written_without_panicking() {
        let store = Arc::new(MockStore::default());
        let intake = pipeline(store.clone(), CountingHandler::new()).with_record_ttl_secs(u64::MAX);

        let outcome = intake.handle(signed("evt_long", "payment_intent.succeeded")).await;

        assert_eq!(outcome.status(), IntakeStatus::OkProcessed);
        assert!(store.writes()[0].expires_at > store.writes()[0].processed_at);
    }
}
