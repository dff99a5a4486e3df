//! Payment handlers: invest and return investment.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{PaymentResponse, ReturnInvestmentResponse};
use crate::app_state::AppState;
use crate::domain::RequestId;
use crate::error::{ErrorResponse, GatewayError};
use crate::network::WalletSession;

/// `POST /requests/{id}/invest` — Pay a funding request.
///
/// # Errors
///
/// Returns [`GatewayError`] if any pre-check, the funds check, or a
/// transaction fails.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/invest",
    tag = "Payments",
    summary = "Invest in a funding request",
    description = "Checks funds, approves the token if needed, pays the outstanding amount, and waits for confirmations. Requires both wallet headers.",
    params(
        ("id" = String, Path, description = "Funding request identifier"),
    ),
    responses(
        (status = 200, description = "Payment confirmed", body = PaymentResponse),
        (status = 401, description = "No wallet connected", body = ErrorResponse),
        (status = 409, description = "Wallet on the wrong network", body = ErrorResponse),
        (status = 422, description = "Insufficient funds or not a funding request", body = ErrorResponse),
        (status = 502, description = "Transaction failed", body = ErrorResponse),
    )
)]
pub async fn invest(
    State(state): State<AppState>,
    Path(id): Path<String>,
    wallet: WalletSession,
) -> Result<impl IntoResponse, GatewayError> {
    let id: RequestId = id.parse()?;
    let flow = state.payment_service.invest(&wallet, &id).await?;
    Ok(Json(PaymentResponse::from(&flow)))
}

/// `POST /requests/{id}/return` — Repay the investor.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller is not the farmer, nobody has
/// invested, the investment was already returned, or the payment fails.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/return",
    tag = "Payments",
    summary = "Return an investment",
    description = "Creates a Return-Investment request payable to the investor for the expected return amount, then pays it from the farmer's wallet.",
    params(
        ("id" = String, Path, description = "Funding request identifier"),
    ),
    responses(
        (status = 200, description = "Return paid", body = ReturnInvestmentResponse),
        (status = 400, description = "No investor yet, or already returned", body = ErrorResponse),
        (status = 403, description = "Caller is not the farmer", body = ErrorResponse),
        (status = 422, description = "Insufficient funds", body = ErrorResponse),
    )
)]
pub async fn return_investment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    wallet: WalletSession,
) -> Result<impl IntoResponse, GatewayError> {
    let id: RequestId = id.parse()?;
    let outcome = state.payment_service.return_investment(&wallet, &id).await?;
    Ok(Json(ReturnInvestmentResponse::from(&outcome)))
}

/// Payment routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests/{id}/invest", post(invest))
        .route("/requests/{id}/return", post(return_investment))
}
