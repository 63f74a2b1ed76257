//! Webhook verification, structural validation and dispatch.
//!
//! Data flow for one delivery:
//!
//! ```text
//! raw body + signature header + secret
//!   -> extract_signature      (header normalization)
//!   -> verify_signature       (HMAC-SHA256, constant-time compare)
//!   -> serde_json::from_slice (only after the signature matched)
//!   -> schema::validate       (first offending field wins)
//!   -> WebhookEvent
//!   -> is_event_recent        (optional, caller decides)
//!   -> WebhookDispatcher      (handler selected by event type)
//! ```
//!
//! Everything here is pure computation except the handler invocation.

mod dispatch;
mod event;
pub mod schema;
mod staleness;

pub use dispatch::{
    BoxedHandler, DispatchError, EventHandler, HandlerRegistry, WebhookDispatcher, create_handler,
};
pub use event::{VerificationFailure, VerificationResult, WebhookEvent, parse_event, parse_event_with};
pub use schema::{EventType, SchemaRevision, ValidationError};
pub use staleness::{DEFAULT_TOLERANCE, EventTimestamp, is_event_recent, is_event_recent_at};

pub use crate::signature::{
    SIGNATURE_HEADER, SignatureError, extract_signature, generate_signature, verify_signature,
};

use crate::config::WebhookConfig;

/// Webhook operations bound to one [`WebhookConfig`].
///
/// Holds nothing beyond the configuration; the free functions in this module
/// are equivalent and can be used directly.
#[derive(Debug, Clone)]
pub struct Webhook {
    config: WebhookConfig,
}

impl Webhook {
    pub fn new(config: WebhookConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    pub fn generate_signature(&self, payload: impl AsRef<[u8]>) -> String {
        generate_signature(payload, self.config.secret_bytes())
    }

    pub fn verify(&self, payload: impl AsRef<[u8]>, signature: &str) -> bool {
        verify_signature(payload, signature, self.config.secret_bytes())
    }

    /// [`parse_event`] against the configured schema revision.
    pub fn parse(&self, payload: impl AsRef<[u8]>, signature: &str) -> VerificationResult {
        parse_event_with(
            payload,
            signature,
            self.config.secret_bytes(),
            self.config.schema,
        )
    }

    /// [`parse`](Self::parse), additionally refusing events outside the
    /// configured tolerance.
    pub fn parse_fresh(&self, payload: impl AsRef<[u8]>, signature: &str) -> VerificationResult {
        let event = self.parse(payload, signature)?;
        if !event.is_recent(self.config.tolerance) {
            return Err(VerificationFailure::Stale);
        }
        Ok(event)
    }

    /// A dispatcher sharing this configuration, with no handlers yet.
    pub fn dispatcher(&self) -> WebhookDispatcher {
        WebhookDispatcher::new(self.config.secret_bytes()).with_revision(self.config.schema)
    }
}
