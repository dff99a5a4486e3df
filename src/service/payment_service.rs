//! Payment service: drives the [`PaymentFlow`] state machine against the
//! payment processor.

use std::sync::Arc;

use chrono::Utc;

use super::{FundingService, RequestDetail};
use crate::domain::content::ReturnInvestmentContent;
use crate::domain::request::{CreateRequestParams, FundingStatus, PaymentNetwork, RequestData};
use crate::domain::{
    ContentKind, EventBus, FundingEvent, PaymentFlow, PaymentStage, RequestContent, RequestId,
    TypedRequest, amount,
};
use crate::error::GatewayError;
use crate::network::{NetworkError, PaymentProcessor, Signer, WalletSession};

/// A settled return investment.
#[derive(Debug, Clone)]
pub struct ReturnOutcome {
    /// The `Return-Investment` request that was created and paid.
    pub request: TypedRequest,
    /// The completed payment flow.
    pub flow: PaymentFlow,
}

/// Orchestration layer for investments and return payments.
///
/// Each payment runs one [`PaymentFlow`] to completion. Every transition
/// is published as [`FundingEvent::PaymentStageChanged`]; failures are
/// published once and returned. Nothing retries.
#[derive(Debug, Clone)]
pub struct PaymentService {
    funding: FundingService,
    processor: Arc<dyn PaymentProcessor>,
    event_bus: EventBus,
    confirmations: u32,
}

impl PaymentService {
    /// Creates a new `PaymentService` waiting `confirmations` blocks on
    /// every transaction.
    #[must_use]
    pub fn new(
        funding: FundingService,
        processor: Arc<dyn PaymentProcessor>,
        event_bus: EventBus,
        confirmations: u32,
    ) -> Self {
        Self {
            funding,
            processor,
            event_bus,
            confirmations,
        }
    }

    /// Confirmations awaited per transaction.
    #[must_use]
    pub const fn confirmations(&self) -> u32 {
        self.confirmations
    }

    /// Invests in a funding request by paying what it still expects.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::WalletNotConnected`] without a signer,
    /// [`GatewayError::UnexpectedContent`] if the request is not a funding
    /// request, a pre-check error, [`GatewayError::InsufficientFunds`], or
    /// the collaborator's error.
    pub async fn invest(
        &self,
        wallet: &WalletSession,
        id: &RequestId,
    ) -> Result<PaymentFlow, GatewayError> {
        let signer = wallet.signer()?;
        let request = self.funding.get(id).await?;
        if request.kind() != ContentKind::FundingRequest {
            return Err(GatewayError::UnexpectedContent(format!(
                "expected {}, got {}",
                ContentKind::FundingRequest,
                request.kind()
            )));
        }
        self.settle(wallet, &signer, request.data).await
    }

    /// Repays the investor of a funding request.
    ///
    /// Creates a `Return-Investment` request for the expected return
    /// amount, payable to the investor, then pays it from the farmer's
    /// wallet.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Forbidden`] if the caller is not the farmer,
    /// [`GatewayError::InvalidRequest`] if nobody invested yet or the
    /// request is already closed, plus every
    /// error [`PaymentService::invest`] can return.
    pub async fn return_investment(
        &self,
        wallet: &WalletSession,
        funding_request_id: &RequestId,
    ) -> Result<ReturnOutcome, GatewayError> {
        let signer = wallet.signer()?;
        let RequestDetail {
            request: funding,
            status,
        } = self.funding.detail(funding_request_id).await?;
        let content = funding.as_funding_request()?;
        let farmer = signer.address();
        if content.farmer_address != farmer {
            return Err(GatewayError::Forbidden(
                "only the farmer can return an investment".to_string(),
            ));
        }
        let investor = funding.investor().ok_or_else(|| {
            GatewayError::InvalidRequest(format!(
                "funding request {funding_request_id} has no investor yet"
            ))
        })?;
        if status == Some(FundingStatus::Closed) {
            return Err(GatewayError::InvalidRequest(format!(
                "funding request {funding_request_id} was already returned"
            )));
        }
        let currency = funding.data.currency.clone();
        let expected_amount =
            amount::parse_units(content.expected_return_amount, currency.decimals)?;

        let request = self
            .funding
            .submit(CreateRequestParams {
                currency,
                expected_amount,
                payee: investor,
                payer: Some(farmer),
                payment_network: PaymentNetwork::fee_free(investor),
                content: RequestContent::ReturnInvestment(ReturnInvestmentContent {
                    identifier: content.identifier.clone(),
                    farmer_address: farmer,
                    investor_address: investor,
                    created: Utc::now(),
                }),
                signer: farmer,
                topics: Vec::new(),
            })
            .await?;
        self.funding.announce_created(&request);
        tracing::info!(
            request_id = %request.id(),
            %funding_request_id,
            %investor,
            expected_amount,
            "return investment created"
        );

        let flow = self.settle(wallet, &signer, request.data.clone()).await?;
        Ok(ReturnOutcome { request, flow })
    }

    /// Runs the payment protocol on a confirmed request.
    async fn settle(
        &self,
        wallet: &WalletSession,
        signer: &Signer,
        request: RequestData,
    ) -> Result<PaymentFlow, GatewayError> {
        let mut flow = PaymentFlow::new(request.request_id.clone());
        if let Err(e) = precheck(wallet, &request) {
            return Err(self.abort(&mut flow, e));
        }

        let payer = signer.address();
        let owed = request.remaining();
        let stage = flow.begin()?;
        self.transition(&flow, stage);

        let sufficient = self
            .call(&mut flow, self.processor.has_sufficient_funds(&request, payer).await)?;
        let stage = flow.funds_checked(sufficient)?;
        self.transition(&flow, stage);
        if !sufficient {
            let err = GatewayError::InsufficientFunds(request.request_id.to_string());
            self.publish_failure(&flow, &err);
            return Err(err);
        }

        let approved = self
            .call(&mut flow, self.processor.has_erc20_approval(&request, payer).await)?;
        let stage = flow.approval_checked(approved)?;
        self.transition(&flow, stage);

        if !approved {
            let tx_hash = self
                .call(&mut flow, self.processor.approve_erc20(&request, signer).await)?;
            let receipt = self.call(
                &mut flow,
                self.processor
                    .wait_for_transaction(&tx_hash, self.confirmations)
                    .await,
            )?;
            let stage = flow.approval_confirmed(&receipt.tx_hash)?;
            self.transition(&flow, stage);
        }

        let tx_hash = self
            .call(&mut flow, self.processor.pay_request(&request, signer).await)?;
        let receipt = self.call(
            &mut flow,
            self.processor
                .wait_for_transaction(&tx_hash, self.confirmations)
                .await,
        )?;
        let stage = flow.payment_confirmed(&receipt.tx_hash)?;
        self.transition(&flow, stage);

        let _ = self.event_bus.publish(FundingEvent::PaymentConfirmed {
            request_id: request.request_id.clone(),
            payer: payer.to_string(),
            amount: owed.to_string(),
            tx_hash: receipt.tx_hash.clone(),
            timestamp: Utc::now(),
        });
        tracing::info!(
            request_id = %request.request_id,
            %payer,
            amount = owed,
            tx_hash = %receipt.tx_hash,
            confirmations = receipt.confirmations,
            "payment confirmed"
        );
        Ok(flow)
    }

    /// Unwraps a collaborator result, failing the flow on error.
    fn call<T>(
        &self,
        flow: &mut PaymentFlow,
        result: Result<T, NetworkError>,
    ) -> Result<T, GatewayError> {
        result.map_err(|e| self.abort(flow, GatewayError::from(e)))
    }

    /// Moves the flow to `Failed`, publishes it, and hands back `err`.
    fn abort(&self, flow: &mut PaymentFlow, err: GatewayError) -> GatewayError {
        match flow.fail(err.to_string()) {
            Ok(stage) => {
                self.transition(flow, stage);
                self.publish_failure(flow, &err);
                err
            }
            Err(refused) => refused,
        }
    }

    fn transition(&self, flow: &PaymentFlow, stage: PaymentStage) {
        let _ = self.event_bus.publish(FundingEvent::PaymentStageChanged {
            request_id: flow.request_id().clone(),
            stage,
            timestamp: Utc::now(),
        });
    }

    fn publish_failure(&self, flow: &PaymentFlow, err: &GatewayError) {
        tracing::warn!(request_id = %flow.request_id(), error = %err, "payment failed");
        let _ = self.event_bus.publish(FundingEvent::PaymentFailed {
            request_id: flow.request_id().clone(),
            reason: err.to_string(),
            timestamp: Utc::now(),
        });
    }
}

/// Checks that need no collaborator: a nonzero, unpaid amount on the
/// wallet's network.
fn precheck(wallet: &WalletSession, request: &RequestData) -> Result<(), GatewayError> {
    if request.expected_amount == 0 {
        return Err(GatewayError::InvalidAmount(format!(
            "request {} expects no payment",
            request.request_id
        )));
    }
    if request.is_fully_funded() {
        return Err(GatewayError::InvalidRequest(format!(
            "request {} is already fully funded",
            request.request_id
        )));
    }
    let expected = request.currency.network.as_str();
    match wallet.network() {
        Some(actual) if actual.eq_ignore_ascii_case(expected) => Ok(()),
        actual => Err(GatewayError::NetworkMismatch {
            expected: expected.to_string(),
            actual: actual.unwrap_or("unknown").to_string(),
        }),
    }
}
