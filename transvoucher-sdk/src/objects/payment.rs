//! Payment request and response types, and the request validators applied
//! before anything is sent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name to messages, as reported by the API on `422`.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

const MAX_TITLE_LEN: usize = 255;
const MAX_REFERENCE_LEN: usize = 255;
const MAX_DESCRIPTION_LEN: usize = 1000;
const MAX_PER_PAGE: u32 = 100;

/// Lifecycle status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Attempting,
    Processing,
    Completed,
    Failed,
    Expired,
    Cancelled,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Attempting => write!(f, "attempting"),
            PaymentStatus::Processing => write!(f, "processing"),
            PaymentStatus::Completed => write!(f, "completed"),
            PaymentStatus::Failed => write!(f, "failed"),
            PaymentStatus::Expired => write!(f, "expired"),
            PaymentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Payer details attached to a payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_of_residence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_of_residence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_state_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_post_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_street: Option<String>,
}

/// Checkout page colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    Light,
}

/// Request payload for creating a payment link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    /// Optional when `is_price_dynamic` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<CustomerDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    /// Two-letter checkout language code, e.g. `en`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_use: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel_on_first_fail: Option<bool>,
    /// Lets the customer choose the amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_price_dynamic: Option<bool>,
}

impl CreatePaymentRequest {
    pub fn new(title: impl Into<String>, amount: f64, currency: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            amount: Some(amount),
            currency: Some(currency.into()),
            ..Default::default()
        }
    }

    /// Check the request locally, collecting every violation.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let dynamic = self.is_price_dynamic.unwrap_or(false);

        match self.amount {
            None if !dynamic => push(&mut errors, "amount", "Amount is required"),
            Some(amount) if !(amount.is_finite() && amount > 0.0) => {
                push(&mut errors, "amount", "Amount must be a positive number")
            }
            _ => {}
        }

        match self.currency.as_deref() {
            None | Some("") => push(&mut errors, "currency", "Currency is required"),
            Some(currency) if currency.chars().count() != 3 => push(
                &mut errors,
                "currency",
                "Currency must be a 3-character string (e.g., USD, EUR)",
            ),
            _ => {}
        }

        if self.title.chars().count() > MAX_TITLE_LEN {
            push(
                &mut errors,
                "title",
                "Title must be a string with maximum 255 characters",
            );
        }

        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                push(
                    &mut errors,
                    "description",
                    "Description must be a string with maximum 1000 characters",
                );
            }
        }

        if let Some(reference_id) = &self.reference_id {
            if reference_id.chars().count() > MAX_REFERENCE_LEN {
                push(
                    &mut errors,
                    "reference_id",
                    "Reference ID must be a string with maximum 255 characters",
                );
            }
        }

        if let Some(expires_at) = &self.expires_at {
            if !is_valid_date(expires_at) {
                push(&mut errors, "expires_at", "Expires at must be a valid date");
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// How a payment was paid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(default)]
    pub card_id: Option<String>,
    #[serde(default)]
    pub card_brand: Option<String>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub processed_through: Option<String>,
}

/// A payment as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub flow_type: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_link_id: Option<String>,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    pub currency: String,
    #[serde(default)]
    pub fiat_base_amount: Option<f64>,
    #[serde(default)]
    pub fiat_total_amount: Option<f64>,
    #[serde(default)]
    pub fiat_currency: Option<String>,
    #[serde(default)]
    pub commodity: Option<String>,
    #[serde(default)]
    pub commodity_amount: Option<f64>,
    #[serde(default)]
    pub settled_amount: Option<f64>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub customer_details: Option<CustomerDetails>,
    pub status: PaymentStatus,
    #[serde(default)]
    pub fail_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_details: Option<Map<String, Value>>,
    #[serde(default)]
    pub blockchain_tx_hash: Option<String>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Filters for listing payments.  Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentListRequest {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub status: Option<PaymentStatus>,
    pub currency: Option<String>,
    /// `YYYY-MM-DD`.
    pub from_date: Option<String>,
    /// `YYYY-MM-DD`.
    pub to_date: Option<String>,
    pub reference: Option<String>,
    pub customer_email: Option<String>,
}

impl PaymentListRequest {
    /// Filter by merchant reference only.
    pub fn by_reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.page == Some(0) {
            push(&mut errors, "page", "Page must be a positive integer");
        }

        if let Some(per_page) = self.per_page {
            if per_page == 0 || per_page > MAX_PER_PAGE {
                push(
                    &mut errors,
                    "per_page",
                    "Per page must be an integer between 1 and 100",
                );
            }
        }

        if self.status == Some(PaymentStatus::Attempting) {
            push(
                &mut errors,
                "status",
                "Status must be one of: pending, processing, completed, failed, expired, cancelled",
            );
        }

        if let Some(currency) = &self.currency {
            if currency.chars().count() != 3 {
                push(&mut errors, "currency", "Currency must be a 3-character string");
            }
        }

        if let Some(from_date) = &self.from_date {
            if !is_valid_date(from_date) {
                push(
                    &mut errors,
                    "from_date",
                    "From date must be a valid date in YYYY-MM-DD format",
                );
            }
        }

        if let Some(to_date) = &self.to_date {
            if !is_valid_date(to_date) {
                push(
                    &mut errors,
                    "to_date",
                    "To date must be a valid date in YYYY-MM-DD format",
                );
            }
        }

        if let Some(email) = &self.customer_email {
            if !is_valid_email(email) {
                push(
                    &mut errors,
                    "customer_email",
                    "Customer email must be a valid email address",
                );
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Query parameters for the set fields, in a stable order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            query.push(("per_page", per_page.to_string()));
        }
        if let Some(status) = self.status {
            query.push(("status", status.to_string()));
        }
        let strings = [
            ("currency", &self.currency),
            ("from_date", &self.from_date),
            ("to_date", &self.to_date),
            ("reference", &self.reference),
            ("customer_email", &self.customer_email),
        ];
        for (name, value) in strings {
            if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
                query.push((name, value.clone()));
            }
        }
        query
    }
}

/// One page of payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentList {
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub count: u64,
}

fn push(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_owned())
        .or_default()
        .push(message.to_owned());
}

/// `YYYY-MM-DD` naming a real calendar date.
fn is_valid_date(value: &str) -> bool {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    value.len() == 10
        && value
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() })
        && time::Date::parse(value, &format).is_ok()
}

/// `local@domain.tld` with no whitespace.
fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((name, tld)) => !name.is_empty() && !tld.is_empty(),
        None => false,
    }
}
