//! Externally-owned account address.
//!
//! [`Address`] is a 20-byte newtype parsed from `0x`-prefixed hex. It is
//! used both as a query key (list every request for an identity) and as a
//! field value (payee, farmer, investor).
//!
//! [`Address::ZERO`] is the single "unset" sentinel. Payloads written by
//! older clients sometimes carry an empty string instead; those are
//! normalized to [`Address::ZERO`] on read and always written back as the
//! zero address.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// A 20-byte account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address, used as the canonical "unset" value.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns `true` for the zero address.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        *self == Self::ZERO
    }

    /// Returns `None` for the zero address, `Some(self)` otherwise.
    #[must_use]
    pub fn non_zero(self) -> Option<Self> {
        if self.is_unset() { None } else { Some(self) }
    }
}

impl FromStr for Address {
    type Err = GatewayError;

    /// Parses `0x`-prefixed hex, case-insensitive. An empty string yields
    /// [`Address::ZERO`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::ZERO);
        }
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| GatewayError::InvalidAddress(format!("missing 0x prefix: {s}")))?;
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| GatewayError::InvalidAddress(format!("{s}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}
