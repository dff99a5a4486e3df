//! Type-safe request identifier.
//!
//! [`RequestId`] wraps the hex string the request store assigns when a
//! request is created, so that request identifiers cannot be confused with
//! addresses, transaction hashes, or free-form content identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Unique identifier of a request in the external store.
///
/// Immutable once assigned. Used as the lookup key for `fromRequestId`,
/// the event discriminator, and the WebSocket subscription target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generates a fresh identifier in the store's format: a `01` version
    /// prefix followed by 64 lowercase hex digits.
    #[must_use]
    pub fn generate() -> Self {
        let high = uuid::Uuid::new_v4();
        let low = uuid::Uuid::new_v4();
        Self(format!(
            "01{}{}",
            hex::encode(high.as_bytes()),
            hex::encode(low.as_bytes())
        ))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RequestId {
    type Err = GatewayError;

    /// Accepts any non-empty hex string; case is normalized to lowercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "request id must not be empty".to_string(),
            ));
        }
        if !trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GatewayError::InvalidRequest(format!(
                "request id is not hex: {trimmed}"
            )));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_unique_ids() {
        let a = RequestId::generate();
        let b = RequestId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn generated_ids_have_store_format() {
        let id = RequestId::generate();
        let s = id.to_string();
        assert_eq!(s.len(), 66);
        assert!(s.starts_with("01"));
        assert!(s.parse::<RequestId>().is_ok());
    }

    #[test]
    fn parse_normalizes_case() {
        let Ok(id) = "01ABcd".parse::<RequestId>() else {
            panic!("valid id");
        };
        assert_eq!(id.as_str(), "01abcd");
    }

    #[test]
    fn parse_rejects_empty_and_non_hex() {
        assert!("".parse::<RequestId>().is_err());
        assert!("  ".parse::<RequestId>().is_err());
        assert!("01xyz".parse::<RequestId>().is_err());
    }

    #[test]
    fn hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = RequestId::generate();
        let mut map = HashMap::new();
        map.insert(id.clone(), "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }
}
