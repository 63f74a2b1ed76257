//! Webhook receiver configuration.

use std::time::Duration;

use crate::webhook::{DEFAULT_TOLERANCE, SchemaRevision};

/// Long-lived settings for verifying incoming webhooks.
#[derive(Clone)]
pub struct WebhookConfig {
    /// Secret key bytes shared with TransVoucher for HMAC signing.
    secret: Box<[u8]>,
    /// Event schema revision delivered to this endpoint.
    pub schema: SchemaRevision,
    /// Accepted clock skew for staleness checks.
    pub tolerance: Duration,
}

impl WebhookConfig {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into().into_boxed_slice(),
            schema: SchemaRevision::default(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_schema(mut self, schema: SchemaRevision) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Duration) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Get the secret key bytes for HMAC signing.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }
}

impl std::fmt::Debug for WebhookConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookConfig")
            .field("secret", &"<redacted>")
            .field("schema", &self.schema)
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let config = WebhookConfig::new("whsec_very_secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("whsec_very_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_defaults() {
        let config = WebhookConfig::new(b"key".to_vec());
        assert_eq!(config.secret_bytes(), b"key");
        assert_eq!(config.schema, SchemaRevision::PaymentIntent);
        assert_eq!(config.tolerance, Duration::from_secs(300));
    }
}
