//! Payment, record, and sandbox DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::request_dto::RequestDto;
use crate::domain::PaymentFlow;
use crate::service::ReturnOutcome;

/// Request body for `POST /requests/{id}/records`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecordBody {
    /// Record text (weight, yield, expenses...).
    pub record: String,
}

/// Outcome of a completed payment flow.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentResponse {
    /// Request that was paid.
    pub request_id: String,
    /// Final stage (`confirmed`).
    pub stage: String,
    /// Every stage visited, in order.
    pub history: Vec<String>,
    /// Approval transaction, if one was needed.
    pub approval_tx: Option<String>,
    /// Payment transaction.
    pub payment_tx: Option<String>,
}

impl From<&PaymentFlow> for PaymentResponse {
    fn from(flow: &PaymentFlow) -> Self {
        Self {
            request_id: flow.request_id().to_string(),
            stage: flow.stage().to_string(),
            history: flow.history().iter().map(ToString::to_string).collect(),
            approval_tx: flow.approval_tx().map(str::to_string),
            payment_tx: flow.payment_tx().map(str::to_string),
        }
    }
}

/// Response body for `POST /requests/{id}/return`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReturnInvestmentResponse {
    /// The `Return-Investment` request created for the repayment.
    pub return_request: RequestDto,
    /// Payment of that request.
    pub payment: PaymentResponse,
}

impl From<&ReturnOutcome> for ReturnInvestmentResponse {
    fn from(outcome: &ReturnOutcome) -> Self {
        Self {
            return_request: RequestDto::from(&outcome.request),
            payment: PaymentResponse::from(&outcome.flow),
        }
    }
}

/// Request body for `POST /sandbox/faucet`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FaucetBody {
    /// Account to credit.
    pub address: String,
    /// Network name.
    pub network: String,
    /// Currency symbol.
    pub currency: String,
    /// Amount in human units as a decimal string.
    pub amount: String,
}

/// Response body for `POST /sandbox/faucet`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FaucetResponse {
    /// Account credited.
    pub address: String,
    /// Network name.
    pub network: String,
    /// Currency symbol.
    pub currency: String,
    /// New balance in smallest units.
    pub balance: String,
}
