//! Typed views of webhook event payloads.
//!
//! Obtain one from a verified event with
//! [`WebhookEvent::payload`](crate::webhook::WebhookEvent::payload).  The
//! structural validator has already guaranteed the required fields, so
//! these only fail on type mismatches in optional fields.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::payment::{CustomerDetails, Payment};

/// Envelope of the `payment_intent.*` revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentEvent {
    pub event: String,
    pub timestamp: String,
    pub data: PaymentIntentData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentIntentData {
    #[serde(default)]
    pub payment_link_id: Option<String>,
    pub transaction: TransactionData,
    #[serde(default)]
    pub sales_channel: Option<SalesChannelData>,
    #[serde(default)]
    pub merchant: Option<MerchantData>,
    #[serde(default)]
    pub payment_details: Option<Map<String, Value>>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub fail_reason: Option<String>,
}

/// The transaction embedded in a `payment_intent.*` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub status: String,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub fiat_base_amount: Option<f64>,
    #[serde(default)]
    pub fiat_total_amount: Option<f64>,
    #[serde(default)]
    pub fiat_currency: Option<String>,
    #[serde(default)]
    pub commodity_amount: Option<f64>,
    #[serde(default)]
    pub settled_amount: Option<f64>,
    #[serde(default)]
    pub commodity: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub blockchain_tx_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesChannelData {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantData {
    pub id: String,
    pub company_name: String,
}

/// Envelope of the flat `payment.*` revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyPaymentEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: String,
    pub data: Payment,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::PaymentStatus;

    #[test]
    fn test_full_payment_intent_event() {
        let event: PaymentIntentEvent = serde_json::from_value(serde_json::json!({
            "event": "payment_intent.created",
            "timestamp": "2024-01-01T00:00:00Z",
            "data": {
                "transaction": {
                    "id": "tx_123",
                    "reference_id": "ref_123",
                    "amount": 100,
                    "currency": "USD",
                    "status": "pending",
                    "fiat_base_amount": 100,
                    "fiat_total_amount": 100,
                    "fiat_currency": "USD",
                    "commodity_amount": 0.1,
                    "commodity": "BTC",
                    "network": "BTC"
                },
                "sales_channel": { "id": "sc_1", "name": "Channel 1", "type": "web" },
                "merchant": { "id": "m_1", "company_name": "Merchant 1" }
            }
        }))
        .unwrap();

        assert_eq!(event.data.transaction.commodity.as_deref(), Some("BTC"));
        assert_eq!(event.data.sales_channel.unwrap().kind, "web");
        assert_eq!(event.data.merchant.unwrap().company_name, "Merchant 1");
    }

    #[test]
    fn test_legacy_event() {
        let event: LegacyPaymentEvent = serde_json::from_value(serde_json::json!({
            "id": "evt_1",
            "type": "payment.completed",
            "created_at": "2024-01-01T00:00:00Z",
            "data": { "id": "pay_1", "amount": 9.99, "currency": "EUR", "status": "completed" }
        }))
        .unwrap();
        assert_eq!(event.kind, "payment.completed");
        assert_eq!(event.data.status, PaymentStatus::Completed);
    }
}
