//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::registry::{Currency, StorageChain};
use crate::domain::request::CurrencyInfo;

/// Currency metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrencyDto {
    /// Ticker symbol (e.g. `"DAI"`).
    pub symbol: String,
    /// Token standard (`ERC20`).
    pub kind: String,
    /// Hex-encoded token address.
    pub token: String,
    /// Network the token lives on.
    pub network: String,
    /// Number of decimal places.
    pub decimals: u8,
}

impl From<&CurrencyInfo> for CurrencyDto {
    fn from(info: &CurrencyInfo) -> Self {
        Self {
            symbol: info.symbol.clone(),
            kind: "ERC20".to_string(),
            token: info.token.to_string(),
            network: info.network.clone(),
            decimals: info.decimals,
        }
    }
}

impl From<&Currency> for CurrencyDto {
    fn from(currency: &Currency) -> Self {
        Self::from(&CurrencyInfo::from(currency))
    }
}

/// Storage chain metadata.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChainDto {
    /// Network name.
    pub name: String,
    /// EVM chain id.
    pub chain_id: u64,
    /// Request node gateway URL.
    pub gateway: String,
}

impl From<&StorageChain> for ChainDto {
    fn from(chain: &StorageChain) -> Self {
        Self {
            name: chain.name.clone(),
            chain_id: chain.chain_id,
            gateway: chain.gateway.clone(),
        }
    }
}
