//! Event-type based dispatch of verified webhook deliveries.
//!
//! Unlike [`parse_event`](super::parse_event), the dispatcher has no result
//! channel for rejected deliveries, so a delivery that fails verification
//! surfaces as [`DispatchError::Rejected`].  Event types without a registered
//! handler are acknowledged without doing anything; new lifecycle states must
//! not break delivery.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::event::{VerificationFailure, WebhookEvent, parse_event_with};
use super::schema::{EventType, SchemaRevision};

/// A callback invoked for one event type.
///
/// Implemented for every `Fn(WebhookEvent) -> impl Future<Output = anyhow::Result<()>>`,
/// so an async closure is usually all that is needed.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: WebhookEvent) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> EventHandler for F
where
    F: Fn(WebhookEvent) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn handle(&self, event: WebhookEvent) -> anyhow::Result<()> {
        (self)(event).await
    }
}

/// Boxed handler as stored in a [`HandlerRegistry`].
pub type BoxedHandler = Box<dyn EventHandler>;

/// Event type to handler mapping.  At most one handler per type.
pub type HandlerRegistry = HashMap<EventType, BoxedHandler>;

/// Errors surfaced by [`WebhookDispatcher::dispatch`].
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The delivery failed verification and should be refused upstream.
    #[error(transparent)]
    Rejected(#[from] VerificationFailure),
    /// The registered handler failed.  The error is passed through as-is.
    #[error(transparent)]
    Handler(anyhow::Error),
}

/// Verifies deliveries and routes them to the handler for their event type.
///
/// The secret and the registry are immutable after construction, so a
/// dispatcher can be shared across concurrent requests behind an `Arc`.
pub struct WebhookDispatcher {
    secret: Arc<[u8]>,
    revision: SchemaRevision,
    tolerance: Option<Duration>,
    handlers: HandlerRegistry,
}

impl std::fmt::Debug for WebhookDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookDispatcher")
            .field("revision", &self.revision)
            .field("tolerance", &self.tolerance)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Build a dispatcher over `handlers` for the default schema revision.
pub fn create_handler(secret: impl AsRef<[u8]>, handlers: HandlerRegistry) -> WebhookDispatcher {
    WebhookDispatcher {
        secret: Arc::from(secret.as_ref()),
        revision: SchemaRevision::default(),
        tolerance: None,
        handlers,
    }
}

impl WebhookDispatcher {
    /// Create a dispatcher with no handlers registered.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        create_handler(secret, HandlerRegistry::new())
    }

    /// Target a specific schema revision.
    pub fn with_revision(mut self, revision: SchemaRevision) -> Self {
        self.revision = revision;
        self
    }

    /// Also reject deliveries whose timestamp is further than `tolerance`
    /// from the local clock.
    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    /// Register an async closure for `event_type`, replacing any previous
    /// handler.
    pub fn on<F, Fut>(self, event_type: EventType, handler: F) -> Self
    where
        F: Fn(WebhookEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_handler(event_type, handler)
    }

    /// Register an [`EventHandler`] for `event_type`, replacing any previous
    /// one.
    pub fn on_handler(mut self, event_type: EventType, handler: impl EventHandler + 'static) -> Self {
        self.handlers.insert(event_type, Box::new(handler));
        self
    }

    pub fn has_handler(&self, event_type: EventType) -> bool {
        self.handlers.contains_key(&event_type)
    }

    /// Verify one delivery and run the matching handler, if any.
    pub async fn dispatch(
        &self,
        payload: impl AsRef<[u8]>,
        signature: &str,
    ) -> Result<(), DispatchError> {
        let event = match parse_event_with(payload, signature, &self.secret, self.revision) {
            Ok(event) => event,
            Err(failure) => {
                tracing::warn!(error = %failure, "Webhook delivery rejected");
                return Err(DispatchError::Rejected(failure));
            }
        };

        if let Some(tolerance) = self.tolerance {
            if !event.is_recent(tolerance) {
                tracing::warn!(
                    event = %event.event_name(),
                    timestamp = %event.timestamp(),
                    "Webhook delivery rejected: stale timestamp"
                );
                return Err(DispatchError::Rejected(VerificationFailure::Stale));
            }
        }

        let event_type = event.event_type();
        let Some(handler) = self.handlers.get(&event_type) else {
            tracing::debug!(event = %event.event_name(), "No handler registered, ignoring");
            return Ok(());
        };

        handler.handle(event).await.map_err(|e| {
            tracing::error!(event_type = %event_type, error = %e, "Webhook handler failed");
            DispatchError::Handler(e)
        })
    }
}
