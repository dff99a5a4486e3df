//! Currency and storage-chain registries.
//!
//! Both registries are immutable maps built once at startup and passed
//! explicitly into every operation that needs them. A lookup miss is a
//! [`GatewayError::Configuration`].

use std::collections::BTreeMap;

use serde::Serialize;

use super::Address;
use crate::error::GatewayError;

/// Token contracts of the built-in catalog.
const DAI_MAINNET: Address = Address::from_bytes([
    0x6b, 0x17, 0x54, 0x74, 0xe8, 0x90, 0x94, 0xc4, 0x4d, 0xa9, 0x8b, 0x95, 0x4e, 0xed, 0xea, 0xc4,
    0x95, 0x27, 0x1d, 0x0f,
]);
const USDC_MAINNET: Address = Address::from_bytes([
    0xa0, 0xb8, 0x69, 0x91, 0xc6, 0x21, 0x8b, 0x36, 0xc1, 0xd1, 0x9d, 0x4a, 0x2e, 0x9e, 0xb0, 0xce,
    0x36, 0x06, 0xeb, 0x48,
]);
const DAI_SEPOLIA: Address = Address::from_bytes([
    0x37, 0x0d, 0xe2, 0x7f, 0xdb, 0x7d, 0x1f, 0xf1, 0xe1, 0xba, 0xa7, 0xd1, 0x1c, 0x58, 0x20, 0xa3,
    0x24, 0xcf, 0x62, 0x3c,
]);
const USDC_SEPOLIA: Address = Address::from_bytes([
    0x1c, 0x7d, 0x4b, 0x19, 0x6c, 0xb0, 0xc7, 0xb0, 0x1d, 0x74, 0x3f, 0xbc, 0x61, 0x16, 0xa9, 0x02,
    0x37, 0x9c, 0x72, 0x38,
]);

/// Token standard of a currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurrencyKind {
    /// ERC-20 token paid through the fee proxy contract.
    Erc20,
}

/// A payable currency on a specific network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Currency {
    /// Ticker symbol (e.g. `"DAI"`).
    pub symbol: String,
    /// Token standard.
    pub kind: CurrencyKind,
    /// Token contract address.
    pub token: Address,
    /// Network name the token lives on (e.g. `"sepolia"`).
    pub network: String,
    /// Number of decimal places.
    pub decimals: u8,
}

/// A chain the request store persists requests through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageChain {
    /// Network name (e.g. `"sepolia"`).
    pub name: String,
    /// EVM chain id.
    pub chain_id: u64,
    /// Base URL of the request node gateway for this chain.
    pub gateway: String,
}

/// Registry of payable currencies keyed by `(symbol, network)`.
#[derive(Debug, Clone, Default)]
pub struct CurrencyRegistry {
    currencies: BTreeMap<(String, String), Currency>,
}

impl CurrencyRegistry {
    /// Builds a registry from a list of currencies. Later entries replace
    /// earlier ones with the same key.
    #[must_use]
    pub fn new(currencies: impl IntoIterator<Item = Currency>) -> Self {
        let currencies = currencies
            .into_iter()
            .map(|c| ((c.symbol.to_ascii_uppercase(), c.network.clone()), c))
            .collect();
        Self { currencies }
    }

    /// Looks up a currency by symbol (case-insensitive) and network.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if no such currency exists.
    pub fn get(&self, symbol: &str, network: &str) -> Result<&Currency, GatewayError> {
        self.currencies
            .get(&(symbol.to_ascii_uppercase(), network.to_string()))
            .ok_or_else(|| {
                GatewayError::Configuration(format!("unknown currency {symbol} on {network}"))
            })
    }

    /// Iterates over all currencies in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.values()
    }
}

/// Registry of storage chains keyed by network name.
#[derive(Debug, Clone, Default)]
pub struct ChainRegistry {
    chains: BTreeMap<String, StorageChain>,
}

impl ChainRegistry {
    /// Builds a registry from a list of chains.
    #[must_use]
    pub fn new(chains: impl IntoIterator<Item = StorageChain>) -> Self {
        let chains = chains.into_iter().map(|c| (c.name.clone(), c)).collect();
        Self { chains }
    }

    /// Looks up a chain by network name.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if the chain is unknown.
    pub fn get(&self, name: &str) -> Result<&StorageChain, GatewayError> {
        self.chains
            .get(name)
            .ok_or_else(|| GatewayError::Configuration(format!("unknown chain {name}")))
    }

    /// Iterates over all chains in name order.
    pub fn iter(&self) -> impl Iterator<Item = &StorageChain> {
        self.chains.values()
    }
}

/// Both registries, shared read-only by the services.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    /// Payable currencies.
    pub currencies: CurrencyRegistry,
    /// Storage chains.
    pub chains: ChainRegistry,
}

impl Registries {
    /// Creates a registry bundle.
    #[must_use]
    pub fn new(currencies: CurrencyRegistry, chains: ChainRegistry) -> Self {
        Self { currencies, chains }
    }

    /// Resolves the currency and chain for a new request in one step.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Configuration`] if either lookup misses.
    pub fn resolve(
        &self,
        symbol: &str,
        chain: &str,
    ) -> Result<(&Currency, &StorageChain), GatewayError> {
        let storage = self.chains.get(chain)?;
        let currency = self.currencies.get(symbol, &storage.name)?;
        Ok((currency, storage))
    }

    /// The built-in catalog: DAI and USDC on mainnet and sepolia, plus the
    /// mainnet, sepolia and gnosis storage chains.
    #[must_use]
    pub fn default_catalog() -> Self {
        let currencies = [
            ("DAI", "mainnet", DAI_MAINNET, 18),
            ("USDC", "mainnet", USDC_MAINNET, 6),
            ("DAI", "sepolia", DAI_SEPOLIA, 18),
            ("USDC", "sepolia", USDC_SEPOLIA, 6),
        ]
        .into_iter()
        .map(|(symbol, network, token, decimals)| Currency {
            symbol: symbol.to_string(),
            kind: CurrencyKind::Erc20,
            token,
            network: network.to_string(),
            decimals,
        });

        let chains = [
            ("mainnet", 1, "https://mainnet.gateway.request.network/"),
            ("sepolia", 11_155_111, "https://sepolia.gateway.request.network/"),
            ("gnosis", 100, "https://xdai.gateway.request.network/"),
        ]
        .into_iter()
        .map(|(name, chain_id, gateway)| StorageChain {
            name: name.to_string(),
            chain_id,
            gateway: gateway.to_string(),
        });

        Self::new(CurrencyRegistry::new(currencies), ChainRegistry::new(chains))
    }
}
