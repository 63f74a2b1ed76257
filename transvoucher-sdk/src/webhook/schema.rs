//! Structural validation of decoded webhook events.
//!
//! The validator works on a generic [`serde_json::Value`] instead of
//! deserializing into a typed record, so that a rejection can name the first
//! field that is wrong.  Checks run in a fixed order and stop at the first
//! violation.
//!
//! Exactly one [`SchemaRevision`] is enforced per validation.  A deployment
//! picks the revision its TransVoucher account delivers and sticks to it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Wire-format revision of the webhook event envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaRevision {
    /// `{ event, timestamp, data: { transaction, sales_channel, merchant, ... } }`
    #[default]
    PaymentIntent,
    /// `{ id, type, created_at, data: Payment }`
    Legacy,
}

/// Revision-independent payment lifecycle state carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Created,
    Attempting,
    Processing,
    /// `payment_intent.succeeded`, or `payment.completed` in the legacy format.
    Succeeded,
    Failed,
    Cancelled,
    Expired,
}

impl EventType {
    pub const ALL: [EventType; 7] = [
        EventType::Created,
        EventType::Attempting,
        EventType::Processing,
        EventType::Succeeded,
        EventType::Failed,
        EventType::Cancelled,
        EventType::Expired,
    ];
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::Created => write!(f, "created"),
            EventType::Attempting => write!(f, "attempting"),
            EventType::Processing => write!(f, "processing"),
            EventType::Succeeded => write!(f, "succeeded"),
            EventType::Failed => write!(f, "failed"),
            EventType::Cancelled => write!(f, "cancelled"),
            EventType::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for SchemaRevision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "payment_intent" => Ok(SchemaRevision::PaymentIntent),
            "legacy" => Ok(SchemaRevision::Legacy),
            other => Err(format!("unknown schema revision: {other}")),
        }
    }
}

impl SchemaRevision {
    /// Field carrying the top-level event identifier, if the revision has one.
    pub fn id_field(self) -> Option<&'static str> {
        match self {
            SchemaRevision::PaymentIntent => None,
            SchemaRevision::Legacy => Some("id"),
        }
    }

    /// Field carrying the event type name.
    pub fn type_field(self) -> &'static str {
        match self {
            SchemaRevision::PaymentIntent => "event",
            SchemaRevision::Legacy => "type",
        }
    }

    /// Field carrying the event timestamp.
    pub fn timestamp_field(self) -> &'static str {
        match self {
            SchemaRevision::PaymentIntent => "timestamp",
            SchemaRevision::Legacy => "created_at",
        }
    }

    /// Resolve a wire event name to its lifecycle state.
    pub fn parse_event_type(self, name: &str) -> Option<EventType> {
        match self {
            SchemaRevision::PaymentIntent => match name {
                "payment_intent.created" => Some(EventType::Created),
                "payment_intent.attempting" => Some(EventType::Attempting),
                "payment_intent.processing" => Some(EventType::Processing),
                "payment_intent.succeeded" => Some(EventType::Succeeded),
                "payment_intent.failed" => Some(EventType::Failed),
                "payment_intent.cancelled" => Some(EventType::Cancelled),
                "payment_intent.expired" => Some(EventType::Expired),
                _ => None,
            },
            SchemaRevision::Legacy => match name {
                "payment.created" => Some(EventType::Created),
                "payment.processing" => Some(EventType::Processing),
                "payment.completed" => Some(EventType::Succeeded),
                "payment.failed" => Some(EventType::Failed),
                "payment.expired" => Some(EventType::Expired),
                "payment.cancelled" => Some(EventType::Cancelled),
                _ => None,
            },
        }
    }

    /// Wire name of a lifecycle state, if this revision delivers it.
    pub fn event_name(self, event_type: EventType) -> Option<&'static str> {
        match (self, event_type) {
            (SchemaRevision::PaymentIntent, EventType::Created) => Some("payment_intent.created"),
            (SchemaRevision::PaymentIntent, EventType::Attempting) => {
                Some("payment_intent.attempting")
            }
            (SchemaRevision::PaymentIntent, EventType::Processing) => {
                Some("payment_intent.processing")
            }
            (SchemaRevision::PaymentIntent, EventType::Succeeded) => {
                Some("payment_intent.succeeded")
            }
            (SchemaRevision::PaymentIntent, EventType::Failed) => Some("payment_intent.failed"),
            (SchemaRevision::PaymentIntent, EventType::Cancelled) => {
                Some("payment_intent.cancelled")
            }
            (SchemaRevision::PaymentIntent, EventType::Expired) => Some("payment_intent.expired"),
            (SchemaRevision::Legacy, EventType::Created) => Some("payment.created"),
            (SchemaRevision::Legacy, EventType::Attempting) => None,
            (SchemaRevision::Legacy, EventType::Processing) => Some("payment.processing"),
            (SchemaRevision::Legacy, EventType::Succeeded) => Some("payment.completed"),
            (SchemaRevision::Legacy, EventType::Failed) => Some("payment.failed"),
            (SchemaRevision::Legacy, EventType::Cancelled) => Some("payment.cancelled"),
            (SchemaRevision::Legacy, EventType::Expired) => Some("payment.expired"),
        }
    }

    /// Locate the embedded payment/transaction record inside `data`.
    pub fn record(self, data: &Map<String, Value>) -> Option<&Map<String, Value>> {
        match self {
            SchemaRevision::PaymentIntent => data.get("transaction")?.as_object(),
            SchemaRevision::Legacy => Some(data),
        }
    }

    fn record_label(self) -> &'static str {
        match self {
            SchemaRevision::PaymentIntent => "Transaction data",
            SchemaRevision::Legacy => "Payment data",
        }
    }
}

/// The first structural violation found in a decoded event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Dotted path of the offending field (`""` for the document itself).
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Fields of a decoded event that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedFields {
    pub event_type: EventType,
}

/// Validate `decoded` against `revision`.
///
/// Order of checks:
/// 1. document is an object;
/// 2. top-level identifier (legacy revision only);
/// 3. type field is a known event name;
/// 4. `data` is an object;
/// 5. timestamp is a non-empty string;
/// 6–9. the embedded record has a non-empty `id`, a numeric `amount > 0`,
///    and non-empty `currency` and `status`.
pub fn validate(decoded: &Value, revision: SchemaRevision) -> Result<ValidatedFields, ValidationError> {
    let Some(event) = decoded.as_object() else {
        return Err(ValidationError::new("", "Event data must be an object"));
    };

    if let Some(id_field) = revision.id_field() {
        if non_empty_str(event, id_field).is_none() {
            return Err(ValidationError::new(id_field, "Event must have a valid ID"));
        }
    }

    let type_field = revision.type_field();
    let Some(name) = non_empty_str(event, type_field) else {
        return Err(ValidationError::new(type_field, "Event must have a valid type"));
    };
    let Some(event_type) = revision.parse_event_type(name) else {
        return Err(ValidationError::new(
            type_field,
            format!("Invalid event type: {name}"),
        ));
    };

    let Some(data) = event.get("data").and_then(Value::as_object) else {
        return Err(ValidationError::new("data", "Event must have valid data"));
    };

    let timestamp_field = revision.timestamp_field();
    if non_empty_str(event, timestamp_field).is_none() {
        return Err(ValidationError::new(
            timestamp_field,
            format!("Event must have a valid {timestamp_field} timestamp"),
        ));
    }

    validate_record(data, revision)?;

    Ok(ValidatedFields { event_type })
}

fn validate_record(data: &Map<String, Value>, revision: SchemaRevision) -> Result<(), ValidationError> {
    let label = revision.record_label();
    let prefix = match revision {
        SchemaRevision::PaymentIntent => "data.transaction",
        SchemaRevision::Legacy => "data",
    };
    let path = |field: &str| format!("{prefix}.{field}");

    let Some(record) = revision.record(data) else {
        return Err(ValidationError::new(
            prefix,
            format!("{label} must be an object"),
        ));
    };

    if non_empty_str(record, "id").is_none() {
        return Err(ValidationError::new(path("id"), format!("{label} must have a valid ID")));
    }

    let amount_ok = record
        .get("amount")
        .and_then(Value::as_f64)
        .is_some_and(|amount| amount > 0.0);
    if !amount_ok {
        return Err(ValidationError::new(
            path("amount"),
            format!("{label} must have a valid amount"),
        ));
    }

    for field in ["currency", "status"] {
        if non_empty_str(record, field).is_none() {
            return Err(ValidationError::new(
                path(field),
                format!("{label} must have a valid {field}"),
            ));
        }
    }

    Ok(())
}

fn non_empty_str<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn intent_event() -> Value {
        json!({
            "event": "payment_intent.succeeded",
            "timestamp": "2024-01-01T00:00:00Z",
            "data": {
                "transaction": {
                    "id": "tx_1",
                    "amount": 10,
                    "currency": "USD",
                    "status": "succeeded"
                }
            }
        })
    }

    fn legacy_event() -> Value {
        json!({
            "id": "evt_1",
            "type": "payment.completed",
            "created_at": "2024-01-01T00:00:00Z",
            "data": {
                "id": "pay_1",
                "amount": 25.5,
                "currency": "EUR",
                "status": "completed"
            }
        })
    }

    fn field_of(value: &Value, revision: SchemaRevision) -> String {
        validate(value, revision).unwrap_err().field
    }

    #[test]
    fn test_valid_events() {
        let fields = validate(&intent_event(), SchemaRevision::PaymentIntent).unwrap();
        assert_eq!(fields.event_type, EventType::Succeeded);

        let fields = validate(&legacy_event(), SchemaRevision::Legacy).unwrap();
        assert_eq!(fields.event_type, EventType::Succeeded);
    }

    #[test]
    fn test_revisions_are_not_mixed() {
        let err = validate(&legacy_event(), SchemaRevision::PaymentIntent).unwrap_err();
        assert_eq!(err.field, "event");

        let err = validate(&intent_event(), SchemaRevision::Legacy).unwrap_err();
        assert_eq!(err.message, "Event must have a valid ID");
    }

    #[test]
    fn test_non_object_document() {
        for value in [json!(null), json!([]), json!("event"), json!(42)] {
            let err = validate(&value, SchemaRevision::PaymentIntent).unwrap_err();
            assert_eq!(err.message, "Event data must be an object");
        }
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        let mut value = intent_event();
        value["event"] = json!("payment_intent.refunded");
        let err = validate(&value, SchemaRevision::PaymentIntent).unwrap_err();
        assert_eq!(err.message, "Invalid event type: payment_intent.refunded");

        value["event"] = json!(7);
        let err = validate(&value, SchemaRevision::PaymentIntent).unwrap_err();
        assert_eq!(err.message, "Event must have a valid type");
    }

    #[test]
    fn test_check_order_reports_first_violation() {
        // Type is checked before data and timestamp.
        let value = json!({ "event": "nope" });
        assert_eq!(field_of(&value, SchemaRevision::PaymentIntent), "event");

        // Data is checked before the timestamp.
        let value = json!({ "event": "payment_intent.created", "data": null });
        assert_eq!(field_of(&value, SchemaRevision::PaymentIntent), "data");

        let mut value = intent_event();
        value["timestamp"] = json!("");
        value["data"]["transaction"]["amount"] = json!(0);
        assert_eq!(field_of(&value, SchemaRevision::PaymentIntent), "timestamp");
    }

    #[test]
    fn test_record_fields() {
        let mut value = intent_event();
        value["data"]["transaction"]
            .as_object_mut()
            .unwrap()
            .remove("amount");
        let err = validate(&value, SchemaRevision::PaymentIntent).unwrap_err();
        assert_eq!(err.field, "data.transaction.amount");
        assert_eq!(err.message, "Transaction data must have a valid amount");

        for bad in [json!(0), json!(-1.5), json!("10")] {
            let mut value = intent_event();
            value["data"]["transaction"]["amount"] = bad;
            assert_eq!(
                field_of(&value, SchemaRevision::PaymentIntent),
                "data.transaction.amount"
            );
        }

        let mut value = legacy_event();
        value["data"]["currency"] = json!("");
        let err = validate(&value, SchemaRevision::Legacy).unwrap_err();
        assert_eq!(err.message, "Payment data must have a valid currency");

        let mut value = legacy_event();
        value["data"]["status"] = json!(null);
        assert_eq!(field_of(&value, SchemaRevision::Legacy), "data.status");

        let mut value = intent_event();
        value["data"] = json!({ "merchant": {} });
        assert_eq!(field_of(&value, SchemaRevision::PaymentIntent), "data.transaction");
    }

    #[test]
    fn test_event_names_round_trip() {
        for revision in [SchemaRevision::PaymentIntent, SchemaRevision::Legacy] {
            for event_type in EventType::ALL {
                if let Some(name) = revision.event_name(event_type) {
                    assert_eq!(revision.parse_event_type(name), Some(event_type));
                }
            }
        }
        assert_eq!(SchemaRevision::Legacy.event_name(EventType::Attempting), None);
    }
}
