//! Parsed webhook events and the verify-then-decode pipeline.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::schema::{self, EventType, SchemaRevision, ValidationError};
use super::staleness;
use crate::signature::verify_signature;

/// Why a delivery was not accepted.
///
/// These are expected outcomes of receiving webhooks from the internet and are
/// returned as values, never raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationFailure {
    #[error("Invalid webhook signature")]
    InvalidSignature,
    #[error("{0}")]
    MalformedPayload(String),
    #[error(transparent)]
    InvalidStructure(#[from] ValidationError),
    #[error("Webhook event is outside the accepted time window")]
    Stale,
}

/// Outcome of [`parse_event`]: the authenticated event, or why it was refused.
pub type VerificationResult = Result<WebhookEvent, VerificationFailure>;

/// A signed, structurally valid webhook event.
///
/// The decoded document is kept exactly as received; accessors borrow from it
/// and nothing mutates it after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    value: Value,
    event_type: EventType,
    revision: SchemaRevision,
}

impl WebhookEvent {
    /// Validate an already-decoded document.  Does not check any signature.
    pub fn from_value(value: Value, revision: SchemaRevision) -> Result<Self, ValidationError> {
        let fields = schema::validate(&value, revision)?;
        Ok(Self {
            value,
            event_type: fields.event_type,
            revision,
        })
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn revision(&self) -> SchemaRevision {
        self.revision
    }

    /// Event name exactly as delivered, e.g. `payment_intent.succeeded`.
    pub fn event_name(&self) -> &str {
        self.str_field(self.revision.type_field()).unwrap_or_default()
    }

    pub fn timestamp(&self) -> &str {
        self.str_field(self.revision.timestamp_field())
            .unwrap_or_default()
    }

    /// Top-level event identifier, when the revision carries one.
    pub fn id(&self) -> Option<&str> {
        self.str_field(self.revision.id_field()?)
    }

    pub fn data(&self) -> &Value {
        &self.value["data"]
    }

    /// The embedded payment/transaction record.
    pub fn record(&self) -> Option<&Map<String, Value>> {
        self.revision.record(self.data().as_object()?)
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Deserialize the event into a typed view such as
    /// [`PaymentIntentEvent`](crate::objects::webhook::PaymentIntentEvent).
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.value)
    }

    /// Whether the event timestamp lies within `tolerance` of now.
    pub fn is_recent(&self, tolerance: Duration) -> bool {
        staleness::is_event_recent(self.timestamp(), tolerance)
    }

    fn str_field(&self, field: &str) -> Option<&str> {
        self.value.get(field).and_then(Value::as_str)
    }
}

/// Verify, decode and validate a webhook delivery against the default
/// [`SchemaRevision`].
///
/// * `payload` – raw request body bytes, exactly as received.
/// * `signature` – canonical `sha256={hex}` signature (see
///   [`extract_signature`](crate::signature::extract_signature)).
/// * `secret` – the webhook secret shared with TransVoucher.
pub fn parse_event(
    payload: impl AsRef<[u8]>,
    signature: &str,
    secret: impl AsRef<[u8]>,
) -> VerificationResult {
    parse_event_with(payload, signature, secret, SchemaRevision::default())
}

/// [`parse_event`] for an explicit schema revision.
///
/// The body is only decoded once the signature has been verified.
pub fn parse_event_with(
    payload: impl AsRef<[u8]>,
    signature: &str,
    secret: impl AsRef<[u8]>,
    revision: SchemaRevision,
) -> VerificationResult {
    let payload = payload.as_ref();

    if !verify_signature(payload, signature, secret) {
        tracing::debug!("Webhook rejected: signature mismatch");
        return Err(VerificationFailure::InvalidSignature);
    }

    let value: Value = serde_json::from_slice(payload).map_err(|e| {
        tracing::debug!(error = %e, "Webhook rejected: payload is not valid JSON");
        VerificationFailure::MalformedPayload(e.to_string())
    })?;

    WebhookEvent::from_value(value, revision).map_err(|e| {
        tracing::debug!(field = %e.field, error = %e, "Webhook rejected: invalid structure");
        VerificationFailure::InvalidStructure(e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::webhook::PaymentIntentEvent;
    use crate::signature::generate_signature;

    const SECRET: &str = "s3cr3t";
    const BODY: &str = r#"{"event":"payment_intent.succeeded","timestamp":"2024-01-01T00:00:00Z","data":{"transaction":{"id":"tx_1","amount":10,"currency":"USD","status":"succeeded"}}}"#;

    #[test]
    fn test_valid_event_is_echoed_verbatim() {
        let sig = generate_signature(BODY, SECRET);
        let event = parse_event(BODY, &sig, SECRET).unwrap();

        let expected: Value = serde_json::from_str(BODY).unwrap();
        assert_eq!(event.as_value(), &expected);
        assert_eq!(event.event_type(), EventType::Succeeded);
        assert_eq!(event.event_name(), "payment_intent.succeeded");
        assert_eq!(event.timestamp(), "2024-01-01T00:00:00Z");
        assert_eq!(event.id(), None);
        assert_eq!(event.record().unwrap()["id"], "tx_1");
    }

    #[test]
    fn test_bad_signature_skips_decoding() {
        let err = parse_event("not json at all", "sha256=deadbeef", SECRET).unwrap_err();
        assert_eq!(err, VerificationFailure::InvalidSignature);
        assert!(err.to_string().contains("signature"));
    }

    #[test]
    fn test_wrong_secret() {
        let sig = generate_signature(BODY, "other");
        let err = parse_event(BODY, &sig, SECRET).unwrap_err();
        assert_eq!(err.to_string(), "Invalid webhook signature");
    }

    #[test]
    fn test_malformed_json() {
        let body = "{\"event\": ";
        let sig = generate_signature(body, SECRET);
        let err = parse_event(body, &sig, SECRET).unwrap_err();
        assert!(matches!(err, VerificationFailure::MalformedPayload(_)));
    }

    #[test]
    fn test_missing_amount() {
        let body = r#"{"event":"payment_intent.succeeded","timestamp":"2024-01-01T00:00:00Z","data":{"transaction":{"id":"tx_1","currency":"USD","status":"succeeded"}}}"#;
        let sig = generate_signature(body, SECRET);
        let err = parse_event(body, &sig, SECRET).unwrap_err();
        let VerificationFailure::InvalidStructure(ref validation) = err else {
            panic!("expected structural failure, got {err:?}");
        };
        assert_eq!(validation.field, "data.transaction.amount");
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_legacy_revision() {
        let body = r#"{"id":"evt_9","type":"payment.failed","created_at":"2024-01-01T00:00:00Z","data":{"id":"pay_9","amount":3,"currency":"GBP","status":"failed"}}"#;
        let sig = generate_signature(body, SECRET);

        let event = parse_event_with(body, &sig, SECRET, SchemaRevision::Legacy).unwrap();
        assert_eq!(event.event_type(), EventType::Failed);
        assert_eq!(event.id(), Some("evt_9"));
        assert_eq!(event.timestamp(), "2024-01-01T00:00:00Z");

        assert!(parse_event(body, &sig, SECRET).is_err());
    }

    #[test]
    fn test_typed_payload_view() {
        let sig = generate_signature(BODY, SECRET);
        let event = parse_event(BODY, &sig, SECRET).unwrap();
        let typed: PaymentIntentEvent = event.payload().unwrap();
        assert_eq!(typed.data.transaction.id, "tx_1");
        assert_eq!(typed.data.transaction.amount, 10.0);
        assert!(typed.data.merchant.is_none());
    }
}
