//! Configuration types for the TransVoucher SDK.
//!
//! These are plain data holders; loading them from files or flags is left to
//! the application.  [`ClientConfig::from_env`] covers the common case.

#[cfg(feature = "client")]
mod client;
mod webhook;

#[cfg(feature = "client")]
pub use client::{ClientConfig, Environment};
pub use webhook::WebhookConfig;
