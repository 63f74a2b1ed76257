//! Reference data: fiat currencies, settlement networks and commodities.

use serde::{Deserialize, Serialize};

/// A fiat processing currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub short_code: String,
    pub name: String,
    pub symbol: String,
    pub current_usd_value: String,
    #[serde(default)]
    pub processed_via_currency_code: Option<String>,
}

/// A blockchain settlement network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub short_code: String,
    pub identifier: String,
    pub name: String,
    #[serde(default)]
    pub token_standard: Option<String>,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub explorer_url: Option<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub is_testnet: bool,
}

/// A settlement cryptocurrency on a specific network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commodity {
    pub short_code: String,
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    pub current_usd_value: String,
    #[serde(default)]
    pub contract_address: Option<String>,
    pub decimals: u32,
    pub network_short_code: String,
}
