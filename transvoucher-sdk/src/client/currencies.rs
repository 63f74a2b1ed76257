//! `/currencies` endpoint.

use super::{ClientError, HttpClient, RequestOptions};
use crate::objects::Currency;
use crate::objects::payment::FieldErrors;

/// Fiat processing currencies.
#[derive(Debug, Clone, Copy)]
pub struct CurrencyService<'a> {
    http: &'a HttpClient,
    options: Option<&'a RequestOptions>,
}

impl<'a> CurrencyService<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http, options: None }
    }

    pub fn with_options(mut self, options: &'a RequestOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// `GET /currencies`.
    pub async fn all(&self) -> Result<Vec<Currency>, ClientError> {
        self.http
            .get("/currencies", &[], self.options)
            .await?
            .into_data()
            .ok_or_else(|| {
                ClientError::validation(
                    "Invalid response from currencies endpoint",
                    FieldErrors::new(),
                )
            })
    }

    /// Case-insensitive lookup by short code.
    pub async fn find_by_code(&self, short_code: &str) -> Result<Option<Currency>, ClientError> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .find(|c| c.short_code.eq_ignore_ascii_case(short_code)))
    }

    pub async fn is_supported(&self, short_code: &str) -> Result<bool, ClientError> {
        Ok(self.find_by_code(short_code).await?.is_some())
    }

    /// Whether payments in `currency` are settled through another currency.
    pub fn is_processed_via_another_currency(&self, currency: &Currency) -> bool {
        currency.processed_via_currency_code.is_some()
    }
}
