//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Currency and chain registries are not
//! configurable here; they are the built-in
//! [`crate::domain::Registries::default_catalog`].

use std::net::SocketAddr;

use anyhow::Context;

use crate::domain::{Address, EventBus};

/// Identity the explore view lists when `MARKETPLACE_IDENTITY` is unset.
pub const DEFAULT_MARKETPLACE_IDENTITY: &str = "0x7128AF8F5AA6abe92b5f9ba9545146027A995B16";

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Confirmations awaited on every approval and payment transaction.
    pub payment_confirmations: u32,

    /// Identity every funding request is indexed under.
    pub marketplace_identity: Address,

    /// Whether `POST /api/v1/sandbox/faucet` is served.
    pub sandbox_faucet_enabled: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            event_bus_capacity: EventBus::DEFAULT_CAPACITY,
            payment_confirmations: 2,
            marketplace_identity: DEFAULT_MARKETPLACE_IDENTITY
                .parse()
                .unwrap_or(Address::ZERO),
            sandbox_faucet_enabled: true,
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to the [`Default`] values when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` or `MARKETPLACE_IDENTITY` is set
    /// but cannot be parsed.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("LISTEN_ADDR") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("LISTEN_ADDR is not a socket address: {raw}"))?,
            Err(_) => defaults.listen_addr,
        };

        let marketplace_identity = match std::env::var("MARKETPLACE_IDENTITY") {
            Ok(raw) => raw
                .parse::<Address>()
                .with_context(|| format!("MARKETPLACE_IDENTITY is not an address: {raw}"))?,
            Err(_) => defaults.marketplace_identity,
        };
        if marketplace_identity.is_unset() {
            anyhow::bail!("MARKETPLACE_IDENTITY must not be the zero address");
        }

        Ok(Self {
            listen_addr,
            event_bus_capacity: parse_env("EVENT_BUS_CAPACITY", defaults.event_bus_capacity),
            payment_confirmations: parse_env(
                "PAYMENT_CONFIRMATIONS",
                defaults.payment_confirmations,
            ),
            marketplace_identity,
            sandbox_faucet_enabled: parse_env_bool(
                "SANDBOX_FAUCET_ENABLED",
                defaults.sandbox_faucet_enabled,
            ),
        })
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key).ok().map(|v| v.to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = GatewayConfig::default();
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.event_bus_capacity, 10_000);
        assert_eq!(config.payment_confirmations, 2);
        assert!(config.sandbox_faucet_enabled);
        assert_eq!(
            config.marketplace_identity.to_string(),
            DEFAULT_MARKETPLACE_IDENTITY.to_ascii_lowercase()
        );
    }

    #[test]
    fn unset_variables_fall_back() {
        assert_eq!(parse_env("AGRIFUND_TEST_UNSET_NUMBER", 7u32), 7);
        assert!(parse_env_bool("AGRIFUND_TEST_UNSET_FLAG", true));
    }
}
