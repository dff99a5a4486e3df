//! Request records as returned by the request store.
//!
//! [`RequestData`] is the untyped shape the store hands back: its content
//! payload is raw JSON. [`TypedRequest`] is a `RequestData` whose
//! discriminator was checked and whose payload parsed into a
//! [`RequestContent`]. Only typed requests flow past the listing layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::content::{ContentKind, FundingRequestContent, RequestContent};
use super::registry::{Currency, CurrencyKind};
use super::{Address, RequestId};
use crate::error::GatewayError;

/// Currency descriptor stored with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrencyInfo {
    /// Token standard.
    pub kind: CurrencyKind,
    /// Token contract address.
    pub token: Address,
    /// Network the request is paid on.
    pub network: String,
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal places of the token.
    pub decimals: u8,
}

impl From<&Currency> for CurrencyInfo {
    fn from(currency: &Currency) -> Self {
        Self {
            kind: currency.kind,
            token: currency.token,
            network: currency.network.clone(),
            symbol: currency.symbol.clone(),
            decimals: currency.decimals,
        }
    }
}

/// ERC-20 fee-proxy payment network parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentNetwork {
    /// Address that receives the payment.
    pub payment_address: Address,
    /// Address that receives the fee ([`Address::ZERO`] for none).
    pub fee_address: Address,
    /// Fee in smallest units.
    pub fee_amount: u128,
}

impl PaymentNetwork {
    /// Fee-free payment to `payment_address`.
    #[must_use]
    pub const fn fee_free(payment_address: Address) -> Self {
        Self {
            payment_address,
            fee_address: Address::ZERO,
            fee_amount: 0,
        }
    }
}

/// Confirmation state of a request in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    /// Submitted but not yet confirmed; not durable.
    Pending,
    /// Confirmed by the store.
    Created,
}

impl RequestState {
    /// Returns the state as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Created => "created",
        }
    }
}

/// A single detected payment against a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEntry {
    /// Account that paid.
    pub payer: Address,
    /// Amount paid in smallest units.
    pub amount: u128,
    /// Transaction that carried the payment.
    pub tx_hash: String,
    /// Time the payment was detected.
    pub timestamp: DateTime<Utc>,
}

/// Amount received so far and the payments that make it up.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Balance {
    /// Total received in smallest units.
    pub paid: u128,
    /// Payment log, oldest first.
    pub payments: Vec<PaymentEntry>,
}

/// Parameters for creating a request in the store.
#[derive(Debug, Clone)]
pub struct CreateRequestParams {
    /// Currency the request is denominated in.
    pub currency: CurrencyInfo,
    /// Amount expected, smallest units.
    pub expected_amount: u128,
    /// Account that should be paid.
    pub payee: Address,
    /// Account expected to pay, if known.
    pub payer: Option<Address>,
    /// Payment network parameters.
    pub payment_network: PaymentNetwork,
    /// Typed content payload.
    pub content: RequestContent,
    /// Identity signing the creation.
    pub signer: Address,
    /// Extra identities the request is indexed under.
    pub topics: Vec<Address>,
}

/// A request as returned by the store.
#[derive(Debug, Clone)]
pub struct RequestData {
    /// Store-assigned identifier.
    pub request_id: RequestId,
    /// Account that should be paid.
    pub payee: Address,
    /// Account expected to pay, if known.
    pub payer: Option<Address>,
    /// Identity that signed the creation.
    pub creator: Address,
    /// Currency descriptor.
    pub currency: CurrencyInfo,
    /// Amount expected, smallest units.
    pub expected_amount: u128,
    /// Payments detected so far; `None` until the store computed it.
    pub balance: Option<Balance>,
    /// Raw content payload. Check [`ContentKind::of`] before reading.
    pub content_data: serde_json::Value,
    /// Payment network parameters.
    pub payment_network: PaymentNetwork,
    /// Creation timestamp.
    pub timestamp: DateTime<Utc>,
    /// Confirmation state.
    pub state: RequestState,
}

impl RequestData {
    /// Reads the content discriminator without interpreting the payload.
    #[must_use]
    pub fn kind(&self) -> Option<ContentKind> {
        ContentKind::of(&self.content_data)
    }

    /// Amount received so far.
    #[must_use]
    pub fn paid(&self) -> u128 {
        self.balance.as_ref().map_or(0, |b| b.paid)
    }

    /// Amount still owed.
    #[must_use]
    pub fn remaining(&self) -> u128 {
        self.expected_amount.saturating_sub(self.paid())
    }

    /// Returns `true` once the received balance covers the expected amount.
    /// A request with no computed balance is never fully funded.
    #[must_use]
    pub fn is_fully_funded(&self) -> bool {
        self.balance
            .as_ref()
            .is_some_and(|b| self.expected_amount > 0 && b.paid >= self.expected_amount)
    }

    /// The first account that paid this request, if any.
    #[must_use]
    pub fn first_payer(&self) -> Option<Address> {
        self.balance
            .as_ref()
            .and_then(|b| b.payments.first())
            .map(|p| p.payer)
    }

    /// Checks the discriminator, then parses the payload.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnexpectedContent`] for unknown or malformed
    /// payloads.
    pub fn into_typed(self) -> Result<TypedRequest, GatewayError> {
        let content = RequestContent::parse(&self.content_data)?;
        Ok(TypedRequest {
            data: self,
            content,
        })
    }
}

/// Lifecycle status of a funding request, derived from related records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FundingStatus {
    /// No investor yet.
    Available,
    /// Invested, awaiting return.
    Funded,
    /// Return investment paid in full.
    Closed,
}

impl FundingStatus {
    /// Returns the status as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Funded => "funded",
            Self::Closed => "closed",
        }
    }
}

/// A request whose payload was checked and parsed.
#[derive(Debug, Clone)]
pub struct TypedRequest {
    /// Store record.
    pub data: RequestData,
    /// Parsed payload.
    pub content: RequestContent,
}

impl TypedRequest {
    /// Shortcut for the store identifier.
    #[must_use]
    pub fn id(&self) -> &RequestId {
        &self.data.request_id
    }

    /// Discriminator of the parsed payload.
    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        self.content.kind()
    }

    /// The funding-request payload, if this is one.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnexpectedContent`] for any other kind.
    pub fn as_funding_request(&self) -> Result<&FundingRequestContent, GatewayError> {
        match &self.content {
            RequestContent::FundingRequest(c) => Ok(c),
            other => Err(GatewayError::UnexpectedContent(format!(
                "expected {}, got {}",
                ContentKind::FundingRequest,
                other.kind()
            ))),
        }
    }

    /// The investor of a funding request or return investment.
    ///
    /// An explicit non-zero `investorAddress` in the payload wins;
    /// otherwise the first payer of a funding request is the investor.
    #[must_use]
    pub fn investor(&self) -> Option<Address> {
        match &self.content {
            RequestContent::FundingRequest(c) => c
                .investor_address
                .non_zero()
                .or_else(|| self.data.first_payer()),
            RequestContent::ReturnInvestment(c) => c.investor_address.non_zero(),
            RequestContent::FundingRecord(_) => None,
        }
    }

    /// Returns `true` if nobody has invested yet.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.kind() == ContentKind::FundingRequest
            && self.investor().is_none()
            && !self.data.is_fully_funded()
    }

    /// Derives the lifecycle status of a funding request given its
    /// related return investments.
    #[must_use]
    pub fn status<'a>(&self, related: impl IntoIterator<Item = &'a Self>) -> FundingStatus {
        let closed = related.into_iter().any(|r| {
            r.kind() == ContentKind::ReturnInvestment
                && r.data.state == RequestState::Created
                && r.content.identifier() == self.content.identifier()
                && r.data.is_fully_funded()
        });
        if closed {
            FundingStatus::Closed
        } else if self.is_available() {
            FundingStatus::Available
        } else {
            FundingStatus::Funded
        }
    }
}


#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::fixtures::*;
    use super::*;

    const FARMER: Address = Address::from_bytes([1u8; 20]);
    const INVESTOR: Address = Address::from_bytes([2u8; 20]);

    #[test]
    fn fully_funded_requires_balance_covering_expected() {
        let content = funding_content("42", FARMER);
        let fresh = data(&content, FARMER, 100);
        assert!(!fresh.is_fully_funded());
        assert_eq!(fresh.remaining(), 100);

        let partial = paid_by(fresh.clone(), INVESTOR, 40);
        assert!(!partial.is_fully_funded());
        assert_eq!(partial.remaining(), 60);

        let full = paid_by(partial, INVESTOR, 60);
        assert!(full.is_fully_funded());
        assert_eq!(full.remaining(), 0);
    }

    #[test]
    fn missing_balance_is_never_fully_funded() {
        let content = funding_content("42", FARMER);
        let mut no_balance = data(&content, FARMER, 0);
        no_balance.balance = None;
        assert!(!no_balance.is_fully_funded());
    }

    #[test]
    fn investor_falls_back_to_first_payer() {
        let content = funding_content("42", FARMER);
        let Ok(typed) = paid_by(data(&content, FARMER, 100), INVESTOR, 100).into_typed() else {
            panic!("typed");
        };
        assert_eq!(typed.investor(), Some(INVESTOR));
        assert!(!typed.is_available());
    }

    #[test]
    fn unfunded_request_is_available() {
        let content = funding_content("42", FARMER);
        let Ok(typed) = data(&content, FARMER, 100).into_typed() else {
            panic!("typed");
        };
        assert_eq!(typed.investor(), None);
        assert_eq!(typed.status([]), FundingStatus::Available);
    }

    #[test]
    fn paid_return_investment_closes_request() {
        let funding = funding_content("42", FARMER);
        let Ok(funded) = paid_by(data(&funding, FARMER, 100), INVESTOR, 100).into_typed() else {
            panic!("typed");
        };
        assert_eq!(funded.status([]), FundingStatus::Funded);

        let ret = return_content("42", FARMER, INVESTOR);
        let Ok(unpaid_return) = data(&ret, INVESTOR, 150).into_typed() else {
            panic!("typed");
        };
        assert_eq!(funded.status([&unpaid_return]), FundingStatus::Funded);

        let Ok(paid_return) = paid_by(data(&ret, INVESTOR, 150), FARMER, 150).into_typed() else {
            panic!("typed");
        };
        assert_eq!(funded.status([&paid_return]), FundingStatus::Closed);

        let other = return_content("43", FARMER, INVESTOR);
        let Ok(unrelated) = paid_by(data(&other, INVESTOR, 150), FARMER, 150).into_typed() else {
            panic!("typed");
        };
        assert_eq!(funded.status([&unrelated]), FundingStatus::Funded);
    }

    #[test]
    fn only_funding_requests_expose_funding_content() {
        let Ok(funding) = data(&funding_content("42", FARMER), FARMER, 100).into_typed() else {
            panic!("typed");
        };
        assert!(funding.as_funding_request().is_ok());

        let Ok(record) = data(&record_content("42", FARMER, "x"), FARMER, 0).into_typed() else {
            panic!("typed");
        };
        assert!(matches!(
            record.as_funding_request(),
            Err(GatewayError::UnexpectedContent(_))
        ));
    }

    #[test]
    fn records_have_no_investor() {
        let record = record_content("42", FARMER, "bought feed");
        let Ok(typed) = data(&record, FARMER, 0).into_typed() else {
            panic!("typed");
        };
        assert_eq!(typed.kind(), ContentKind::FundingRecord);
        assert_eq!(typed.investor(), None);
        assert!(!typed.is_available());
    }
}
