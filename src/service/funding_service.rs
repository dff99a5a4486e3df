//! Funding service: creates requests and records, lists and classifies
//! what the store returns.

use std::sync::Arc;

use chrono::Utc;

use super::validation::{NewFundingRequest, require_text};
use crate::domain::content::{FundingRecordContent, FundingRequestContent};
use crate::domain::request::{
    CreateRequestParams, CurrencyInfo, FundingStatus, PaymentNetwork, RequestData, RequestState,
};
use crate::domain::{
    Address, ContentKind, EventBus, FundingEvent, Registries, RequestContent, RequestFilter,
    RequestId, TypedRequest, amount,
};
use crate::error::GatewayError;
use crate::network::{NetworkError, RequestStore, WalletSession};

/// A request together with its derived lifecycle status.
#[derive(Debug, Clone)]
pub struct RequestDetail {
    /// The typed request.
    pub request: TypedRequest,
    /// Lifecycle status, for funding requests only.
    pub status: Option<FundingStatus>,
}

/// Orchestration layer for request creation and discovery.
///
/// Stateless coordinator over a [`RequestStore`]. Every creation follows
/// the same pattern: validate → resolve registries → submit → wait for
/// confirmation → emit event → return the typed request.
#[derive(Debug, Clone)]
pub struct FundingService {
    store: Arc<dyn RequestStore>,
    registries: Arc<Registries>,
    event_bus: EventBus,
    marketplace: Address,
}

impl FundingService {
    /// Creates a new `FundingService`.
    ///
    /// `marketplace` is the identity every funding request is indexed
    /// under; the explore view lists it.
    #[must_use]
    pub fn new(
        store: Arc<dyn RequestStore>,
        registries: Arc<Registries>,
        event_bus: EventBus,
        marketplace: Address,
    ) -> Self {
        Self {
            store,
            registries,
            event_bus,
            marketplace,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the configured registries.
    #[must_use]
    pub fn registries(&self) -> &Arc<Registries> {
        &self.registries
    }

    /// Identity the explore view lists.
    #[must_use]
    pub const fn marketplace(&self) -> Address {
        self.marketplace
    }

    /// Creates a funding request for the connected farmer.
    ///
    /// The farmer is both payee and `farmerAddress`; the investor starts
    /// as [`Address::ZERO`]. The expected amount is the investment amount
    /// in the currency's smallest units.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input,
    /// [`GatewayError::WalletNotConnected`] without a signer,
    /// [`GatewayError::Configuration`] if currency or chain is unknown, or
    /// the collaborator's error if submission fails.
    pub async fn create_funding_request(
        &self,
        wallet: &WalletSession,
        input: NewFundingRequest,
    ) -> Result<TypedRequest, GatewayError> {
        input.validate()?;
        let signer = wallet.signer()?;
        let farmer = signer.address();
        let (currency, chain) = self.registries.resolve(&input.currency, &input.chain)?;
        let expected_amount = amount::parse_units(input.investment_amount, currency.decimals)?;

        let content = RequestContent::FundingRequest(FundingRequestContent {
            category: input.category,
            description: input.description.trim().to_string(),
            identifier: input.identifier.trim().to_string(),
            chain: chain.name.clone(),
            currency: currency.symbol.clone(),
            investment_amount: input.investment_amount,
            expected_return_amount: input.expected_return_amount,
            expected_return_period: input.expected_return_period,
            farmer_address: farmer,
            investor_address: Address::ZERO,
            passport_image: input.passport_image.uri,
            created: Utc::now(),
        });

        let request = self
            .submit(CreateRequestParams {
                currency: CurrencyInfo::from(currency),
                expected_amount,
                payee: farmer,
                payer: None,
                payment_network: PaymentNetwork::fee_free(farmer),
                content,
                signer: farmer,
                topics: vec![self.marketplace],
            })
            .await?;

        self.announce_created(&request);
        tracing::info!(
            request_id = %request.id(),
            %farmer,
            currency = %currency.symbol,
            network = %currency.network,
            expected_amount,
            "funding request created"
        );
        Ok(request)
    }

    /// Appends a progress record to a funding request.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::WalletNotConnected`] without a signer,
    /// [`GatewayError::Forbidden`] if the caller is not the farmer, or the
    /// lookup/submission error.
    pub async fn add_record(
        &self,
        wallet: &WalletSession,
        funding_request_id: &RequestId,
        text: &str,
    ) -> Result<TypedRequest, GatewayError> {
        require_text("record", text)?;
        let signer = wallet.signer()?;
        let parent = self.get(funding_request_id).await?;
        let funding = parent.as_funding_request()?;
        if funding.farmer_address != signer.address() {
            return Err(GatewayError::Forbidden(
                "only the farmer can add records".to_string(),
            ));
        }

        let farmer = funding.farmer_address;
        let identifier = funding.identifier.clone();
        let content = RequestContent::FundingRecord(FundingRecordContent {
            identifier: identifier.clone(),
            record: text.trim().to_string(),
            farmer_address: farmer,
            created: Utc::now(),
        });

        let record = self
            .submit(CreateRequestParams {
                currency: parent.data.currency.clone(),
                expected_amount: 0,
                payee: farmer,
                payer: None,
                payment_network: PaymentNetwork::fee_free(farmer),
                content,
                signer: farmer,
                topics: Vec::new(),
            })
            .await?;

        let _ = self.event_bus.publish(FundingEvent::RecordAdded {
            request_id: record.id().clone(),
            funding_request_id: funding_request_id.clone(),
            identifier: identifier.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(request_id = %record.id(), %funding_request_id, identifier = %identifier, "record added");
        Ok(record)
    }

    /// Confirmed records of a funding request, newest first.
    ///
    /// # Errors
    ///
    /// Returns the lookup error, or [`GatewayError::UnexpectedContent`] if
    /// `funding_request_id` is not a funding request.
    pub async fn records_for(
        &self,
        funding_request_id: &RequestId,
    ) -> Result<Vec<TypedRequest>, GatewayError> {
        let parent = self.get(funding_request_id).await?;
        let funding = parent.as_funding_request()?;
        let filter = RequestFilter::all()
            .kind(ContentKind::FundingRecord)
            .farmer(funding.farmer_address);

        let mut records: Vec<TypedRequest> = self
            .list_for_identity(Some(funding.farmer_address), &filter)
            .await?
            .into_iter()
            .filter(|r| {
                r.data.state == RequestState::Created
                    && r.content.identifier() == funding.identifier
            })
            .collect();
        records.sort_by_key(|r| r.content.created());
        records.reverse();
        Ok(records)
    }

    /// Fetches every request for `identity`, classifies it, and keeps what
    /// `filter` matches.
    ///
    /// An unset identity (`None` or [`Address::ZERO`]) yields an empty list
    /// without calling the store. Payloads with an unknown or malformed
    /// discriminator are skipped.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the fetch fails.
    pub async fn list_for_identity(
        &self,
        identity: Option<Address>,
        filter: &RequestFilter,
    ) -> Result<Vec<TypedRequest>, GatewayError> {
        let Some(identity) = identity.and_then(Address::non_zero) else {
            return Ok(Vec::new());
        };
        let raw = self.store.from_identity(identity).await?;
        let fetched = raw.len();
        let requests = filter.apply(classify(raw));
        tracing::debug!(%identity, fetched, kept = requests.len(), "listed requests");
        Ok(requests)
    }

    /// Funding requests listed on the marketplace.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the fetch fails.
    pub async fn explore(&self, available_only: bool) -> Result<Vec<TypedRequest>, GatewayError> {
        let mut filter = RequestFilter::explore();
        filter.available_only = available_only;
        self.list_for_identity(Some(self.marketplace), &filter).await
    }

    /// Funding requests created by the connected farmer.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the fetch fails.
    pub async fn farm(&self, wallet: &WalletSession) -> Result<Vec<TypedRequest>, GatewayError> {
        match wallet.address() {
            Some(caller) => {
                self.list_for_identity(Some(caller), &RequestFilter::farm(caller))
                    .await
            }
            None => Ok(Vec::new()),
        }
    }

    /// Fully funded funding requests the connected wallet invested in.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the fetch fails.
    pub async fn investments(
        &self,
        wallet: &WalletSession,
    ) -> Result<Vec<TypedRequest>, GatewayError> {
        match wallet.address() {
            Some(caller) => {
                self.list_for_identity(Some(caller), &RequestFilter::investments(caller))
                    .await
            }
            None => Ok(Vec::new()),
        }
    }

    /// Looks up a single request and checks its payload.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequestNotFound`] if the store does not know
    /// the request, [`GatewayError::Network`] for other store failures, or
    /// [`GatewayError::UnexpectedContent`] for a bad payload.
    pub async fn get(&self, id: &RequestId) -> Result<TypedRequest, GatewayError> {
        match self.store.from_request_id(id).await {
            Ok(data) => data.into_typed(),
            Err(NetworkError::RequestNotFound(_)) => {
                Err(GatewayError::RequestNotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Looks up a request and derives its lifecycle status from the
    /// farmer's related requests.
    ///
    /// # Errors
    ///
    /// Same as [`FundingService::get`], plus store errors from the related
    /// lookup.
    pub async fn detail(&self, id: &RequestId) -> Result<RequestDetail, GatewayError> {
        let request = self.get(id).await?;
        let status = match request.as_funding_request() {
            Ok(funding) => {
                let related = self
                    .list_for_identity(
                        Some(funding.farmer_address),
                        &RequestFilter::all().kind(ContentKind::ReturnInvestment),
                    )
                    .await?;
                Some(request.status(&related))
            }
            Err(_) => None,
        };
        Ok(RequestDetail { request, status })
    }

    /// Submits `params`, waits for confirmation, and parses the result.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's error unchanged.
    pub async fn submit(&self, params: CreateRequestParams) -> Result<TypedRequest, GatewayError> {
        let kind = params.content.kind();
        let request_id = self.store.create_request(params).await?;
        tracing::debug!(%request_id, %kind, "request submitted, waiting for confirmation");
        let confirmed = self.store.wait_for_confirmation(&request_id).await?;
        confirmed.into_typed()
    }

    /// Publishes [`FundingEvent::RequestCreated`] for a confirmed request.
    pub fn announce_created(&self, request: &TypedRequest) {
        let _ = self.event_bus.publish(FundingEvent::RequestCreated {
            request_id: request.id().clone(),
            kind: request.kind(),
            payee: request.data.payee.to_string(),
            expected_amount: request.data.expected_amount.to_string(),
            timestamp: Utc::now(),
        });
    }
}

/// Checks the discriminator of every request, dropping unreadable ones.
fn classify(raw: Vec<RequestData>) -> Vec<TypedRequest> {
    raw.into_iter()
        .filter_map(|data| {
            let request_id = data.request_id.clone();
            match data.into_typed() {
                Ok(typed) => Some(typed),
                Err(e) => {
                    tracing::warn!(%request_id, error = %e, "skipping request with unreadable content");
                    None
                }
            }
        })
        .collect()
}
