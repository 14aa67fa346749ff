//! Typed dispatch of verified events to business handlers.
//!
//! The registry is built once at startup from a set of handlers, each of
//! which declares the categories it serves. After `build()` it is immutable
//! and shared across requests behind an `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use super::errors::HandlerError;
use super::event::{EventCategory, WebhookEvent};

/// Handler for one payload shape of Stripe webhook event.
///
/// A handler may serve several categories that share a payload shape; it
/// reads [`WebhookEvent::event_type`] to tell them apart.
#[async_trait]
pub trait WebhookEventHandler: Send + Sync {
    /// Short stable name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Returns the categories this handler processes.
    fn handles(&self) -> &'static [EventCategory];

    /// Handles the webhook event. The event is read-only.
    async fn handle(&self, event: &WebhookEvent) -> Result<(), HandlerError>;
}

/// What the dispatcher did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// A handler ran and succeeded.
    Handled { handler: &'static str },
    /// No handler is bound to the category. Not an error.
    Unhandled,
}

/// Dispatches webhook events to the appropriate handler.
#[async_trait]
pub trait WebhookDispatcher: Send + Sync {
    /// Find a handler for the given category.
    ///
    /// Returns `None` if no handler is registered for this category.
    fn get_handler(&self, category: EventCategory) -> Option<&dyn WebhookEventHandler>;

    /// Dispatch an event to its handler.
    ///
    /// Returns `Ok(Dispatch::Unhandled)` if no handler is registered.
    async fn dispatch(&self, event: &WebhookEvent) -> Result<Dispatch, HandlerError> {
        match self.get_handler(event.category()) {
            Some(handler) => {
                handler.handle(event).await?;
                Ok(Dispatch::Handled {
                    handler: handler.name(),
                })
            }
            None => Ok(Dispatch::Unhandled),
        }
    }
}

/// Startup errors when binding handlers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("category '{category}' is bound to both '{first}' and '{second}'")]
    DuplicateCategory {
        category: EventCategory,
        first: &'static str,
        second: &'static str,
    },

    #[error("handler '{handler}' cannot bind the unhandled category")]
    UnhandledCategory { handler: &'static str },
}

/// Static category → handler table.
pub struct HandlerRegistry {
    handlers: HashMap<EventCategory, Arc<dyn WebhookEventHandler>>,
}

impl HandlerRegistry {
    pub fn builder() -> HandlerRegistryBuilder {
        HandlerRegistryBuilder::default()
    }

    /// A registry with no bindings: every event is unhandled.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Bound categories, in provider-string order.
    pub fn categories(&self) -> Vec<EventCategory> {
        let mut categories: Vec<_> = self.handlers.keys().copied().collect();
        categories.sort_by_key(|c| c.as_str());
        categories
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for category in self.categories() {
            if let Some(handler) = self.handlers.get(&category) {
                map.entry(&category.as_str(), &handler.name());
            }
        }
        map.finish()
    }
}

#[async_trait]
impl WebhookDispatcher for HandlerRegistry {
    fn get_handler(&self, category: EventCategory) -> Option<&dyn WebhookEventHandler> {
        self.handlers.get(&category).map(|handler| handler.as_ref())
    }
}

/// Collects handlers and checks their bindings.
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: Vec<Arc<dyn WebhookEventHandler>>,
}

impl HandlerRegistryBuilder {
    pub fn register(mut self, handler: Arc<dyn WebhookEventHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Bind every declared category.
    ///
    /// Fails if a category is claimed twice or a handler claims `Unhandled`.
    pub fn build(self) -> Result<HandlerRegistry, RegistryError> {
        let mut handlers: HashMap<EventCategory, Arc<dyn WebhookEventHandler>> = HashMap::new();

        for handler in self.handlers {
            for &category in handler.handles() {
                if !category.is_recognized() {
                    return Err(RegistryError::UnhandledCategory {
                        handler: handler.name(),
                    });
                }
                if let Some(existing) = handlers.get(&category) {
                    return Err(RegistryError::DuplicateCategory {
                        category,
                        first: existing.name(),
                        second: handler.name(),
                    });
                }
                handlers.insert(category, Arc::clone(&handler));
            }
        }

        Ok(HandlerRegistry { handlers })
    }
}
