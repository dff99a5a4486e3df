//! Caller identity and signing capability.

use crate::domain::Address;
use crate::error::GatewayError;

/// Signing capability for a connected account.
///
/// Only obtainable from a connected [`WalletSession`]; holding one is the
/// proof that the caller may authorize transactions for `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signer {
    address: Address,
}

impl Signer {
    /// Account this signer signs for.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }
}

/// The caller's wallet as seen by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletSession {
    address: Option<Address>,
    network: Option<String>,
}

impl WalletSession {
    /// A wallet connected to `network` with `address`.
    #[must_use]
    pub fn connected(address: Address, network: impl Into<String>) -> Self {
        Self {
            address: address.non_zero(),
            network: Some(network.into()),
        }
    }

    /// No wallet.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Builds a session from optional raw header values.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidAddress`] if an address is present
    /// but malformed.
    pub fn from_parts(address: Option<&str>, network: Option<&str>) -> Result<Self, GatewayError> {
        let address = address
            .map(str::parse::<Address>)
            .transpose()?
            .and_then(Address::non_zero);
        let network = network
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_ascii_lowercase);
        Ok(Self { address, network })
    }

    /// Connected address, if any.
    #[must_use]
    pub const fn address(&self) -> Option<Address> {
        self.address
    }

    /// Connected address or a wallet error.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::WalletNotConnected`] if no address is set.
    pub fn require_address(&self) -> Result<Address, GatewayError> {
        self.address.ok_or(GatewayError::WalletNotConnected)
    }

    /// Network the wallet is connected to, if known.
    #[must_use]
    pub fn network(&self) -> Option<&str> {
        self.network.as_deref()
    }

    /// Signing capability for the connected account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::WalletNotConnected`] if no address is set.
    pub fn signer(&self) -> Result<Signer, GatewayError> {
        self.require_address().map(|address| Signer { address })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn disconnected_has_no_signer() {
        let wallet = WalletSession::disconnected();
        assert!(matches!(wallet.signer(), Err(GatewayError::WalletNotConnected)));
        assert_eq!(wallet.network(), None);
    }

    #[test]
    fn zero_address_counts_as_disconnected() {
        let wallet = WalletSession::connected(Address::ZERO, "sepolia");
        assert!(wallet.require_address().is_err());
    }

    #[test]
    fn from_parts_normalizes_network() {
        let Ok(wallet) = WalletSession::from_parts(
            Some("0x7128AF8F5AA6abe92b5f9ba9545146027A995B16"),
            Some(" Sepolia "),
        ) else {
            panic!("valid headers");
        };
        assert_eq!(wallet.network(), Some("sepolia"));
        let Ok(signer) = wallet.signer() else {
            panic!("connected wallet has a signer");
        };
        assert_eq!(Some(signer.address()), wallet.address());
    }

    #[test]
    fn from_parts_rejects_bad_address() {
        assert!(WalletSession::from_parts(Some("nope"), None).is_err());
        let Ok(empty) = WalletSession::from_parts(None, Some("")) else {
            panic!("missing headers are fine");
        };
        assert_eq!(empty, WalletSession::disconnected());
    }
}
