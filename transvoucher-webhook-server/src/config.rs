//! Command line and environment configuration.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use transvoucher_sdk::config::WebhookConfig;
use transvoucher_sdk::webhook::SchemaRevision;

/// Reference receiver for TransVoucher webhooks
#[derive(Parser, Debug)]
#[command(name = "transvoucher-webhook-server")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long, env = "TRANSVOUCHER_WEBHOOK_LISTEN", default_value = "127.0.0.1:3000")]
    pub listen: SocketAddr,

    /// Webhook secret shared with TransVoucher
    #[arg(long, env = "TRANSVOUCHER_WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: String,

    /// Schema revision deliveries are validated against (payment_intent or legacy)
    #[arg(long, env = "TRANSVOUCHER_WEBHOOK_SCHEMA", default_value = "payment_intent")]
    pub schema: SchemaRevision,

    /// Accepted clock skew in seconds
    #[arg(long, env = "TRANSVOUCHER_WEBHOOK_TOLERANCE_SECS", default_value_t = 300)]
    pub tolerance_secs: u64,

    /// Reject deliveries whose timestamp is outside the tolerance
    #[arg(long, env = "TRANSVOUCHER_WEBHOOK_ENFORCE_STALENESS")]
    pub enforce_staleness: bool,
}

/// Errors in otherwise well-formed arguments.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("webhook secret must not be empty")]
    EmptySecret,
    #[error("tolerance must be greater than zero")]
    ZeroTolerance,
}

impl Args {
    pub fn webhook_config(&self) -> Result<WebhookConfig, ConfigError> {
        if self.secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if self.tolerance_secs == 0 {
            return Err(ConfigError::ZeroTolerance);
        }
        Ok(WebhookConfig::new(self.secret.as_bytes())
            .with_schema(self.schema)
            .with_tolerance(Duration::from_secs(self.tolerance_secs)))
    }
}
