//! `/networks` endpoint.

use super::{ClientError, HttpClient, RequestOptions};
use crate::objects::Network;
use crate::objects::payment::FieldErrors;

/// Blockchain settlement networks.
#[derive(Debug, Clone, Copy)]
pub struct NetworkService<'a> {
    http: &'a HttpClient,
    options: Option<&'a RequestOptions>,
}

impl<'a> NetworkService<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http, options: None }
    }

    pub fn with_options(mut self, options: &'a RequestOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// `GET /networks`.
    pub async fn all(&self) -> Result<Vec<Network>, ClientError> {
        self.http
            .get("/networks", &[], self.options)
            .await?
            .into_data()
            .ok_or_else(|| {
                ClientError::validation("Invalid response from networks endpoint", FieldErrors::new())
            })
    }

    pub async fn find_by_code(&self, short_code: &str) -> Result<Option<Network>, ClientError> {
        Ok(self
            .all()
            .await?
            .into_iter()
            .find(|n| n.short_code.eq_ignore_ascii_case(short_code)))
    }

    pub async fn is_supported(&self, short_code: &str) -> Result<bool, ClientError> {
        Ok(self.find_by_code(short_code).await?.is_some())
    }

    pub async fn mainnets(&self) -> Result<Vec<Network>, ClientError> {
        let mut networks = self.all().await?;
        networks.retain(|n| !n.is_testnet);
        Ok(networks)
    }

    pub async fn testnets(&self) -> Result<Vec<Network>, ClientError> {
        let mut networks = self.all().await?;
        networks.retain(|n| n.is_testnet);
        Ok(networks)
    }

    pub fn is_testnet(&self, network: &Network) -> bool {
        network.is_testnet
    }
}
