//! `/commodities` endpoint.

use super::{ClientError, HttpClient, RequestOptions};
use crate::objects::Commodity;
use crate::objects::payment::FieldErrors;

/// Settlement cryptocurrencies.
#[derive(Debug, Clone, Copy)]
pub struct CommodityService<'a> {
    http: &'a HttpClient,
    options: Option<&'a RequestOptions>,
}

impl<'a> CommodityService<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http, options: None }
    }

    pub fn with_options(mut self, options: &'a RequestOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// `GET /commodities`.
    pub async fn all(&self) -> Result<Vec<Commodity>, ClientError> {
        self.http
            .get("/commodities", &[], self.options)
            .await?
            .into_data()
            .ok_or_else(|| {
                ClientError::validation(
                    "Invalid response from commodities endpoint",
                    FieldErrors::new(),
                )
            })
    }

    pub async fn find_by_code(&self, short_code: &str) -> Result<Option<Commodity>, ClientError> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .find(|c| c.short_code.eq_ignore_ascii_case(short_code)))
    }

    pub async fn is_supported(&self, short_code: &str) -> Result<bool, ClientError> {
        Ok(self.find_by_code(short_code).await?.is_some())
    }

    /// Commodities settled on the network with `network_short_code`.
    pub async fn by_network(&self, network_short_code: &str) -> Result<Vec<Commodity>, ClientError> {
        let mut commodities = self.all().await?;
        commodities.retain(|c| c.network_short_code.eq_ignore_ascii_case(network_short_code));
        Ok(commodities)
    }

    pub async fn native_tokens(&self) -> Result<Vec<Commodity>, ClientError> {
        let mut commodities = self.all().await?;
        commodities.retain(|c| self.is_native_token(c));
        Ok(commodities)
    }

    pub async fn contract_tokens(&self) -> Result<Vec<Commodity>, ClientError> {
        let mut commodities = self.all().await?;
        commodities.retain(|c| !self.is_native_token(c));
        Ok(commodities)
    }

    /// A commodity without a contract address is the network's native coin.
    pub fn is_native_token(&self, commodity: &Commodity) -> bool {
        commodity
            .contract_address
            .as_deref()
            .is_none_or(|addr| addr.trim().is_empty())
    }
}
