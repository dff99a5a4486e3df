//! Typed content payloads stored inside requests.
//!
//! The request store is untyped on the retrieval side: funding requests,
//! progress records and return investments share one collection and are
//! told apart only by the `type` field of their content payload.
//! [`ContentKind`] reads that discriminator without touching the rest of
//! the payload; [`RequestContent`] is the full tagged union.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Address;
use crate::error::GatewayError;

/// Content-type discriminator values as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// A farmer's ask for investment capital.
    #[serde(rename = "Funding-Request")]
    FundingRequest,
    /// A farmer-authored progress update.
    #[serde(rename = "Funding-Record")]
    FundingRecord,
    /// A repayment from the farmer to the investor.
    #[serde(rename = "Return-Investment")]
    ReturnInvestment,
}

impl ContentKind {
    /// Returns the wire discriminator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FundingRequest => "Funding-Request",
            Self::FundingRecord => "Funding-Record",
            Self::ReturnInvestment => "Return-Investment",
        }
    }

    /// Reads the discriminator of a raw payload.
    ///
    /// Returns `None` when the payload has no `type` string or the value
    /// is not a known kind.
    #[must_use]
    pub fn of(payload: &serde_json::Value) -> Option<Self> {
        payload
            .get("type")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }
}

impl FromStr for ContentKind {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Funding-Request" => Ok(Self::FundingRequest),
            "Funding-Record" => Ok(Self::FundingRecord),
            "Return-Investment" => Ok(Self::ReturnInvestment),
            other => Err(GatewayError::UnexpectedContent(other.to_string())),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of crop or livestock being funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    /// Cattle.
    Cattle,
    /// Grains.
    Grains,
    /// Poultry.
    Poultry,
    /// Coffee.
    Coffee,
}

impl FromStr for Category {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cattle" => Ok(Self::Cattle),
            "Grains" => Ok(Self::Grains),
            "Poultry" => Ok(Self::Poultry),
            "Coffee" => Ok(Self::Coffee),
            other => Err(GatewayError::InvalidRequest(format!(
                "unknown category: {other}"
            ))),
        }
    }
}

/// Period after which the investor expects the return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReturnPeriod {
    /// One month.
    #[serde(rename = "1m")]
    OneMonth,
    /// Three months.
    #[serde(rename = "3m")]
    ThreeMonths,
    /// Six months.
    #[serde(rename = "6m")]
    SixMonths,
    /// One year.
    #[serde(rename = "1y")]
    OneYear,
}

impl FromStr for ReturnPeriod {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Self::OneMonth),
            "3m" => Ok(Self::ThreeMonths),
            "6m" => Ok(Self::SixMonths),
            "1y" => Ok(Self::OneYear),
            other => Err(GatewayError::InvalidRequest(format!(
                "unknown return period: {other}"
            ))),
        }
    }
}

/// Payload of a `Funding-Request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRequestContent {
    /// Crop or livestock category.
    pub category: Category,
    /// Free-form description.
    pub description: String,
    /// Farmer-chosen identifier shared with records and returns.
    pub identifier: String,
    /// Network the request is paid on.
    pub chain: String,
    /// Currency symbol.
    pub currency: String,
    /// Required investment, human units.
    pub investment_amount: Decimal,
    /// Amount the farmer promises to return, human units.
    pub expected_return_amount: Decimal,
    /// Period until the return.
    pub expected_return_period: ReturnPeriod,
    /// Farmer (creator and payee).
    pub farmer_address: Address,
    /// Investor, [`Address::ZERO`] until known.
    #[serde(default)]
    pub investor_address: Address,
    /// Reference to the farmer's passport image.
    pub passport_image: String,
    /// Creation time.
    pub created: DateTime<Utc>,
}

/// Payload of a `Funding-Record`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRecordContent {
    /// Identifier of the funding request this record belongs to.
    pub identifier: String,
    /// Record text (e.g. weight, crop yield, expenses).
    pub record: String,
    /// Farmer who wrote the record.
    pub farmer_address: Address,
    /// Creation time.
    pub created: DateTime<Utc>,
}

/// Payload of a `Return-Investment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnInvestmentContent {
    /// Identifier of the funding request being repaid.
    pub identifier: String,
    /// Farmer paying the return.
    pub farmer_address: Address,
    /// Investor receiving the return.
    pub investor_address: Address,
    /// Creation time.
    pub created: DateTime<Utc>,
}

/// Tagged union of every payload the gateway writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RequestContent {
    /// `Funding-Request` payload.
    #[serde(rename = "Funding-Request")]
    FundingRequest(FundingRequestContent),
    /// `Funding-Record` payload.
    #[serde(rename = "Funding-Record")]
    FundingRecord(FundingRecordContent),
    /// `Return-Investment` payload.
    #[serde(rename = "Return-Investment")]
    ReturnInvestment(ReturnInvestmentContent),
}

impl RequestContent {
    /// Parses a raw payload after checking its discriminator.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnexpectedContent`] if the discriminator is
    /// missing or unknown, or if the payload does not match its kind.
    pub fn parse(payload: &serde_json::Value) -> Result<Self, GatewayError> {
        let kind = ContentKind::of(payload).ok_or_else(|| {
            let raw = payload
                .get("type")
                .map_or_else(|| "<missing>".to_string(), ToString::to_string);
            GatewayError::UnexpectedContent(raw)
        })?;
        serde_json::from_value(payload.clone())
            .map_err(|e| GatewayError::UnexpectedContent(format!("malformed {kind}: {e}")))
    }

    /// Serializes the payload for submission.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if serialization fails.
    pub fn to_payload(&self) -> Result<serde_json::Value, GatewayError> {
        serde_json::to_value(self).map_err(|e| GatewayError::Internal(e.to_string()))
    }

    /// Returns the discriminator of this payload.
    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        match self {
            Self::FundingRequest(_) => ContentKind::FundingRequest,
            Self::FundingRecord(_) => ContentKind::FundingRecord,
            Self::ReturnInvestment(_) => ContentKind::ReturnInvestment,
        }
    }

    /// Returns the shared identifier linking related records.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::FundingRequest(c) => &c.identifier,
            Self::FundingRecord(c) => &c.identifier,
            Self::ReturnInvestment(c) => &c.identifier,
        }
    }

    /// Returns the farmer who authored this payload.
    #[must_use]
    pub fn farmer(&self) -> Address {
        match self {
            Self::FundingRequest(c) => c.farmer_address,
            Self::FundingRecord(c) => c.farmer_address,
            Self::ReturnInvestment(c) => c.farmer_address,
        }
    }

    /// Returns the creation time written into the payload.
    #[must_use]
    pub fn created(&self) -> DateTime<Utc> {
        match self {
            Self::FundingRequest(c) => c.created,
            Self::FundingRecord(c) => c.created,
            Self::ReturnInvestment(c) => c.created,
        }
    }
}
