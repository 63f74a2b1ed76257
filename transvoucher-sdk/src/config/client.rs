//! API client configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::ClientError;

const SANDBOX_BASE_URL: &str = "https://api-sandbox.transvoucher.com/v1";
const PRODUCTION_BASE_URL: &str = "https://api.transvoucher.com/v1";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Minimum accepted API key length after trimming.
const MIN_API_KEY_LEN: usize = 10;

/// TransVoucher deployment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_BASE_URL,
            Environment::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Sandbox => write!(f, "sandbox"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            other => Err(format!(
                "Environment must be either \"sandbox\" or \"production\", got {other:?}"
            )),
        }
    }
}

/// Settings for [`TransVoucherClient`](crate::client::TransVoucherClient).
#[derive(Clone)]
pub struct ClientConfig {
    /// Bearer token sent with every request.
    pub api_key: String,
    pub environment: Environment,
    /// Overrides the environment's default base URL.
    pub base_url: Option<Url>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, environment: Environment) -> Self {
        Self {
            api_key: api_key.into(),
            environment,
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn sandbox(api_key: impl Into<String>) -> Self {
        Self::new(api_key, Environment::Sandbox)
    }

    pub fn production(api_key: impl Into<String>) -> Self {
        Self::new(api_key, Environment::Production)
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from `TRANSVOUCHER_API_KEY`, `TRANSVOUCHER_ENVIRONMENT`,
    /// `TRANSVOUCHER_BASE_URL` and `TRANSVOUCHER_TIMEOUT_SECS`.
    ///
    /// Only the API key is required.  The result is validated.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let mut errors = BTreeMap::new();

        let api_key = lookup("TRANSVOUCHER_API_KEY").unwrap_or_default();

        let environment = match lookup("TRANSVOUCHER_ENVIRONMENT") {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                errors.insert("environment".to_owned(), vec![e]);
                Environment::default()
            }),
            None => Environment::default(),
        };

        let mut config = Self::new(api_key, environment);

        if let Some(raw) = lookup("TRANSVOUCHER_BASE_URL") {
            match Url::parse(&raw) {
                Ok(url) => config.base_url = Some(url),
                Err(_) => {
                    errors.insert(
                        "baseUrl".to_owned(),
                        vec!["Base URL must be a valid URL".to_owned()],
                    );
                }
            }
        }

        if let Some(raw) = lookup("TRANSVOUCHER_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.timeout = Duration::from_secs(secs),
                Err(_) => {
                    errors.insert(
                        "timeout".to_owned(),
                        vec!["Timeout must be a positive number".to_owned()],
                    );
                }
            }
        }

        if let Err(ClientError::Validation { errors: more, .. }) = config.validate() {
            errors.extend(more);
        }

        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ClientError::validation("Invalid configuration", errors))
        }
    }

    /// Base URL requests are resolved against.
    pub fn resolved_base_url(&self) -> Result<Url, ClientError> {
        match &self.base_url {
            Some(url) => Ok(url.clone()),
            None => Url::parse(self.environment.default_base_url())
                .map_err(|e| ClientError::Network(format!("Request error: {e}"))),
        }
    }

    /// Whether `api_key` looks like a usable key.
    pub fn is_valid_api_key(api_key: &str) -> bool {
        api_key.trim().len() >= MIN_API_KEY_LEN
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ClientError> {
        let mut errors = BTreeMap::new();

        if self.api_key.trim().is_empty() {
            errors.insert("apiKey".to_owned(), vec!["API key is required".to_owned()]);
        } else if !Self::is_valid_api_key(&self.api_key) {
            errors.insert(
                "apiKey".to_owned(),
                vec!["API key format is invalid".to_owned()],
            );
        }

        if self.timeout.is_zero() {
            errors.insert(
                "timeout".to_owned(),
                vec!["Timeout must be a positive number".to_owned()],
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ClientError::validation("Invalid configuration", errors))
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
