//! Funding-request DTOs for create, get, and list operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::CurrencyDto;
use crate::domain::amount;
use crate::domain::{Address, ContentKind, RequestFilter, TypedRequest};
use crate::error::GatewayError;
use crate::service::{NewFundingRequest, PassportImage, RequestDetail};

/// Passport image reference in a create request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PassportImageDto {
    /// Where the uploaded image is stored.
    pub uri: String,
    /// MIME type (`image/jpeg` or `image/jpg`).
    pub content_type: String,
    /// Image size in bytes (max 5 000 000).
    pub size_bytes: u64,
}

/// Request body for `POST /requests`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateFundingRequestBody {
    /// `Cattle`, `Grains`, `Poultry` or `Coffee`.
    pub category: String,
    /// Free-text description.
    pub description: String,
    /// Farmer-chosen identifier.
    pub identifier: String,
    /// Storage chain name (e.g. `"sepolia"`).
    pub chain: String,
    /// Currency symbol (e.g. `"DAI"`).
    pub currency: String,
    /// Capital requested, human units as a decimal string.
    pub investment_amount: String,
    /// Promised return, human units as a decimal string.
    pub expected_return_amount: String,
    /// `1m`, `3m`, `6m` or `1y`.
    pub expected_return_period: String,
    /// Passport image attachment.
    pub passport_image: PassportImageDto,
}

impl TryFrom<CreateFundingRequestBody> for NewFundingRequest {
    type Error = GatewayError;

    fn try_from(body: CreateFundingRequestBody) -> Result<Self, Self::Error> {
        Ok(Self {
            category: body.category.trim().parse()?,
            description: body.description,
            identifier: body.identifier,
            chain: body.chain.trim().to_ascii_lowercase(),
            currency: body.currency.trim().to_string(),
            investment_amount: amount::parse_positive(
                "investment_amount",
                &body.investment_amount,
            )?,
            expected_return_amount: amount::parse_positive(
                "expected_return_amount",
                &body.expected_return_amount,
            )?,
            expected_return_period: body.expected_return_period.trim().parse()?,
            passport_image: PassportImage {
                uri: body.passport_image.uri,
                content_type: body.passport_image.content_type,
                size_bytes: body.passport_image.size_bytes,
            },
        })
    }
}

/// A typed request as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RequestDto {
    /// Store identifier.
    pub request_id: String,
    /// Content discriminator (`Funding-Request`, `Funding-Record`,
    /// `Return-Investment`).
    pub kind: String,
    /// `pending` or `created`.
    pub state: String,
    /// Payee address.
    pub payee: String,
    /// Expected payer address, if known.
    pub payer: Option<String>,
    /// Currency descriptor.
    pub currency: CurrencyDto,
    /// Expected amount in smallest units.
    pub expected_amount: String,
    /// Amount received so far in smallest units.
    pub paid_amount: String,
    /// Expected amount in human units.
    pub expected_amount_formatted: Option<String>,
    /// Whether the received balance covers the expected amount.
    pub fully_funded: bool,
    /// Investor, if known.
    pub investor: Option<String>,
    /// Lifecycle status (`available`, `funded`, `closed`); detail view only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Typed content payload as stored.
    #[schema(value_type = Object)]
    pub content: serde_json::Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&TypedRequest> for RequestDto {
    fn from(request: &TypedRequest) -> Self {
        let data = &request.data;
        Self {
            request_id: data.request_id.to_string(),
            kind: request.kind().to_string(),
            state: data.state.as_str().to_string(),
            payee: data.payee.to_string(),
            payer: data.payer.map(|p| p.to_string()),
            currency: CurrencyDto::from(&data.currency),
            expected_amount: data.expected_amount.to_string(),
            paid_amount: data.paid().to_string(),
            expected_amount_formatted: amount::format_units(
                data.expected_amount,
                data.currency.decimals,
            )
            .map(|d| d.to_string()),
            fully_funded: data.is_fully_funded(),
            investor: request.investor().map(|a| a.to_string()),
            status: None,
            content: data.content_data.clone(),
            created_at: data.timestamp,
        }
    }
}

impl From<&RequestDetail> for RequestDto {
    fn from(detail: &RequestDetail) -> Self {
        let mut dto = Self::from(&detail.request);
        dto.status = detail.status.map(|s| s.as_str().to_string());
        dto
    }
}

/// List response for every listing endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct RequestListResponse {
    /// Matching requests.
    pub data: Vec<RequestDto>,
    /// Number of matching requests.
    pub total: usize,
}

impl RequestListResponse {
    /// Wraps a listing.
    #[must_use]
    pub fn from_requests(requests: &[TypedRequest]) -> Self {
        let data: Vec<RequestDto> = requests.iter().map(RequestDto::from).collect();
        Self {
            total: data.len(),
            data,
        }
    }
}

/// Query parameters for `GET /requests`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListRequestsQuery {
    /// Identity whose requests are fetched; omitted yields an empty list.
    pub identity: Option<String>,
    /// Content discriminator to keep.
    pub kind: Option<String>,
    /// Keep only requests authored by this farmer.
    pub farmer: Option<String>,
    /// Keep only requests funded by this investor.
    pub investor: Option<String>,
    /// Keep only fully funded (`true`) or open (`false`) requests.
    pub fully_funded: Option<bool>,
    /// Keep only requests without an investor.
    pub available: Option<bool>,
}

impl ListRequestsQuery {
    /// Parses the query into an identity and a filter.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidAddress`] or
    /// [`GatewayError::InvalidRequest`] for malformed values.
    pub fn into_filter(self) -> Result<(Option<Address>, RequestFilter), GatewayError> {
        let identity = parse_optional_address(self.identity.as_deref())?;
        let mut filter = RequestFilter::all();
        if let Some(kind) = self.kind.as_deref() {
            let kind = kind
                .trim()
                .parse::<ContentKind>()
                .map_err(|_| GatewayError::InvalidRequest(format!("unknown kind: {kind}")))?;
            filter = filter.kind(kind);
        }
        if let Some(farmer) = parse_optional_address(self.farmer.as_deref())? {
            filter = filter.farmer(farmer);
        }
        if let Some(investor) = parse_optional_address(self.investor.as_deref())? {
            filter = filter.investor(investor);
        }
        if let Some(fully_funded) = self.fully_funded {
            filter = filter.fully_funded(fully_funded);
        }
        if self.available.unwrap_or(false) {
            filter = filter.available();
        }
        Ok((identity, filter))
    }
}

/// Query parameters for `GET /explore`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ExploreQuery {
    /// Keep only requests nobody has invested in yet.
    pub available: Option<bool>,
}

/// Empty and zero addresses both mean "not given".
fn parse_optional_address(raw: Option<&str>) -> Result<Option<Address>, GatewayError> {
    raw.map(str::parse::<Address>)
        .transpose()
        .map(|a| a.and_then(Address::non_zero))
}
