//! Input validation for new funding requests and records.

use rust_decimal::Decimal;

use crate::domain::content::{Category, ReturnPeriod};
use crate::error::GatewayError;

/// Largest passport image accepted, in bytes.
pub const MAX_PASSPORT_BYTES: u64 = 5_000_000;

/// Content types accepted for the passport image.
pub const PASSPORT_CONTENT_TYPES: [&str; 2] = ["image/jpeg", "image/jpg"];

/// Reference to an uploaded passport image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassportImage {
    /// Where the image is stored.
    pub uri: String,
    /// MIME type reported by the uploader.
    pub content_type: String,
    /// Size of the image in bytes.
    pub size_bytes: u64,
}

impl PassportImage {
    /// Checks the reference, type and size.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] naming the first failed rule.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.uri.trim().is_empty() {
            return Err(GatewayError::InvalidRequest(
                "passport image reference is required".to_string(),
            ));
        }
        if self.size_bytes > MAX_PASSPORT_BYTES {
            return Err(GatewayError::InvalidRequest(format!(
                "passport image is {} bytes, max is {MAX_PASSPORT_BYTES}",
                self.size_bytes
            )));
        }
        let content_type = self.content_type.trim().to_ascii_lowercase();
        if !PASSPORT_CONTENT_TYPES.contains(&content_type.as_str()) {
            return Err(GatewayError::InvalidRequest(format!(
                "passport image must be .jpg or .jpeg, got {}",
                self.content_type
            )));
        }
        Ok(())
    }
}

/// Input for a new funding request, as entered by the farmer.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFundingRequest {
    /// Crop or livestock category.
    pub category: Category,
    /// Free-text description.
    pub description: String,
    /// Farmer-chosen identifier shared with records and returns.
    pub identifier: String,
    /// Storage chain name.
    pub chain: String,
    /// Currency symbol.
    pub currency: String,
    /// Capital requested.
    pub investment_amount: Decimal,
    /// Amount the farmer promises to return.
    pub expected_return_amount: Decimal,
    /// When the return is due.
    pub expected_return_period: ReturnPeriod,
    /// Passport image attachment.
    pub passport_image: PassportImage,
}

impl NewFundingRequest {
    /// Checks every field rule before anything is submitted.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for empty text or a bad
    /// image and [`GatewayError::InvalidAmount`] for non-positive amounts.
    pub fn validate(&self) -> Result<(), GatewayError> {
        require_text("description", &self.description)?;
        require_text("identifier", &self.identifier)?;
        require_text("chain", &self.chain)?;
        require_text("currency", &self.currency)?;
        require_positive("investmentAmount", self.investment_amount)?;
        require_positive("expectedReturnAmount", self.expected_return_amount)?;
        self.passport_image.validate()
    }
}

/// Rejects empty or whitespace-only text.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] naming `field`.
pub fn require_text(field: &str, value: &str) -> Result<(), GatewayError> {
    if value.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(format!("{field} is required")));
    }
    Ok(())
}

fn require_positive(field: &str, value: Decimal) -> Result<(), GatewayError> {
    if value <= Decimal::ZERO {
        return Err(GatewayError::InvalidAmount(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}
