//! HTTP client for the TransVoucher API.
//!
//! Gated behind the `client` cargo feature so that receivers which only
//! verify webhooks do not pull in `reqwest`.

mod commodities;
mod currencies;
mod http;
mod networks;
mod payments;

pub use commodities::CommodityService;
pub use currencies::CurrencyService;
pub use http::{HttpClient, RequestOptions};
pub use networks::NetworkService;
pub use payments::PaymentService;

use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

use crate::config::{ClientConfig, Environment};
use crate::objects::payment::FieldErrors;

/// Errors produced by the SDK HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered `401`.
    #[error("authentication error ({status}): {message}")]
    Authentication {
        status: StatusCode,
        message: String,
        body: Option<Value>,
    },

    /// Local validation failed, or the server answered `422`.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        errors: FieldErrors,
        status: Option<StatusCode>,
    },

    /// The server returned any other non-2xx status code.
    #[error("api error ({status}): {message}")]
    Api {
        status: StatusCode,
        message: String,
        body: Option<Value>,
    },

    /// No response was received, or the request could not be built.
    #[error("{0}")]
    Network(String),

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn validation(message: impl Into<String>, errors: FieldErrors) -> Self {
        ClientError::Validation {
            message: message.into(),
            errors,
            status: None,
        }
    }

    /// Map a non-success HTTP response onto the error taxonomy.
    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        let body: Option<Value> = serde_json::from_slice(body).ok();
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("An API error occurred")
                    .to_owned()
            });

        match status {
            StatusCode::UNAUTHORIZED => ClientError::Authentication {
                status,
                message,
                body,
            },
            StatusCode::UNPROCESSABLE_ENTITY => {
                let errors = body
                    .as_ref()
                    .and_then(|b| b.get("errors"))
                    .and_then(|e| serde_json::from_value(e.clone()).ok())
                    .unwrap_or_default();
                ClientError::Validation {
                    message,
                    errors,
                    status: Some(status),
                }
            }
            _ => ClientError::Api {
                status,
                message,
                body,
            },
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Authentication { .. } => "AUTHENTICATION_ERROR",
            ClientError::Validation { .. } => "VALIDATION_ERROR",
            ClientError::Api { .. } | ClientError::Json(_) => "API_ERROR",
            ClientError::Network(_) => "NETWORK_ERROR",
        }
    }

    /// HTTP status of the response that caused the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Authentication { status, .. } | ClientError::Api { status, .. } => {
                Some(*status)
            }
            ClientError::Validation { status, .. } => *status,
            ClientError::Network(_) | ClientError::Json(_) => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            ClientError::Network(format!("Request error: {e}"))
        } else {
            ClientError::Network("Network error: No response received".to_owned())
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(e: url::ParseError) -> Self {
        ClientError::Network(format!("Request error: {e}"))
    }
}

/// Entry point of the API client: a validated configuration plus one shared
/// transport, with the services borrowed from it.
#[derive(Debug, Clone)]
pub struct TransVoucherClient {
    http: HttpClient,
}

impl TransVoucherClient {
    /// Validate `config` and build the transport.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self {
            http: HttpClient::new(config)?,
        })
    }

    pub fn sandbox(api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(ClientConfig::sandbox(api_key))
    }

    pub fn production(api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::new(ClientConfig::production(api_key))
    }

    /// Replace the configuration, rebuilding the transport.
    pub fn with_config(self, config: ClientConfig) -> Result<Self, ClientError> {
        Self::new(config)
    }

    /// Switch to another environment, keeping the API key and timeout.
    ///
    /// A custom base URL is dropped.
    pub fn switch_environment(self, environment: Environment) -> Result<Self, ClientError> {
        let mut config = self.config().clone();
        config.environment = environment;
        config.base_url = None;
        self.with_config(config)
    }

    /// Whether `api_key` looks like a usable key.
    pub fn validate_api_key(api_key: &str) -> bool {
        ClientConfig::is_valid_api_key(api_key)
    }

    pub fn config(&self) -> &ClientConfig {
        self.http.config()
    }

    pub fn environment(&self) -> Environment {
        self.config().environment
    }

    pub fn is_production(&self) -> bool {
        self.environment() == Environment::Production
    }

    pub fn is_sandbox(&self) -> bool {
        self.environment() == Environment::Sandbox
    }

    pub fn base_url(&self) -> &Url {
        self.http.base_url()
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn payments(&self) -> PaymentService<'_> {
        PaymentService::new(&self.http)
    }

    pub fn currencies(&self) -> CurrencyService<'_> {
        CurrencyService::new(&self.http)
    }

    pub fn networks(&self) -> NetworkService<'_> {
        NetworkService::new(&self.http)
    }

    pub fn commodities(&self) -> CommodityService<'_> {
        CommodityService::new(&self.http)
    }
}
