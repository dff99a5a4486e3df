//! Sandbox faucet.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{FaucetBody, FaucetResponse};
use crate::app_state::AppState;
use crate::domain::{Address, amount};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /sandbox/faucet` — Credit tokens to a sandbox account.
///
/// # Errors
///
/// Returns [`GatewayError::Forbidden`] when the faucet is disabled, or a
/// validation/configuration error for bad input.
#[utoipa::path(
    post,
    path = "/api/v1/sandbox/faucet",
    tag = "Sandbox",
    summary = "Credit sandbox tokens",
    request_body = FaucetBody,
    responses(
        (status = 200, description = "Balance credited", body = FaucetResponse),
        (status = 400, description = "Invalid input or unknown currency", body = ErrorResponse),
        (status = 403, description = "Faucet disabled", body = ErrorResponse),
    )
)]
pub async fn faucet(
    State(state): State<AppState>,
    Json(body): Json<FaucetBody>,
) -> Result<impl IntoResponse, GatewayError> {
    if !state.config.sandbox_faucet_enabled {
        return Err(GatewayError::Forbidden("sandbox faucet is disabled".to_string()));
    }
    let owner: Address = body.address.parse()?;
    if owner.is_unset() {
        return Err(GatewayError::InvalidAddress("address is required".to_string()));
    }
    let network = body.network.trim().to_ascii_lowercase();
    let currency = state
        .funding_service
        .registries()
        .currencies
        .get(&body.currency, &network)?;
    let human = amount::parse_positive("amount", &body.amount)?;
    let units = amount::parse_units(human, currency.decimals)?;

    let balance = state
        .sandbox
        .credit(owner, &network, currency.token, units)
        .await;
    tracing::info!(%owner, network = %network, currency = %currency.symbol, units, "faucet credited");

    Ok(Json(FaucetResponse {
        address: owner.to_string(),
        network,
        currency: currency.symbol.clone(),
        balance: balance.to_string(),
    }))
}

/// Sandbox routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/sandbox/faucet", post(faucet))
}
