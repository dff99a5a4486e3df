//! Wallet session extractor.
//!
//! The caller's wallet is described by two headers. Both are optional:
//! read-only endpoints work without them, and operations that sign fail
//! with `WalletNotConnected` (401).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::GatewayError;
use crate::network::WalletSession;

/// Header carrying the connected account address.
pub const WALLET_ADDRESS_HEADER: &str = "x-wallet-address";

/// Header carrying the network the wallet is connected to.
pub const WALLET_NETWORK_HEADER: &str = "x-wallet-network";

impl<S> FromRequestParts<S> for WalletSession
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
        };
        Self::from_parts(header(WALLET_ADDRESS_HEADER), header(WALLET_NETWORK_HEADER))
    }
}
