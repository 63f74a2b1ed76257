//! Rust SDK for the TransVoucher payment platform.
//!
//! The [`webhook`] module authenticates and interprets inbound webhook
//! deliveries; it has no I/O of its own and works with any HTTP framework.
//! With the default `client` feature, [`client::TransVoucherClient`] talks to
//! the REST API.
//!
//! ```no_run
//! use transvoucher_sdk::webhook::{EventType, WebhookDispatcher};
//!
//! # async fn run(body: &[u8], signature: &str) -> Result<(), transvoucher_sdk::webhook::DispatchError> {
//! let dispatcher = WebhookDispatcher::new("whsec_...")
//!     .on(EventType::Succeeded, |event| async move {
//!         println!("paid: {:?}", event.record().and_then(|r| r.get("id")));
//!         anyhow::Ok(())
//!     });
//! dispatcher.dispatch(body, signature).await
//! # }
//! ```

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod objects;
pub mod signature;
pub mod webhook;

#[cfg(feature = "client")]
pub use client::{ClientError, TransVoucherClient};
pub use config::WebhookConfig;
pub use webhook::{
    DispatchError, EventType, SchemaRevision, VerificationFailure, VerificationResult, Webhook,
    WebhookDispatcher, WebhookEvent, create_handler, parse_event,
};
