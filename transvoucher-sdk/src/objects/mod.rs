//! Request and response types of the TransVoucher API and webhook payloads.

pub mod catalog;
pub mod payment;
pub mod response;
pub mod webhook;

pub use catalog::{Commodity, Currency, Network};
pub use payment::{
    CreatePaymentRequest, CustomerDetails, Payment, PaymentList, PaymentListRequest, PaymentStatus,
};
pub use response::ApiResponse;
pub use webhook::{LegacyPaymentEvent, PaymentIntentEvent, TransactionData};
