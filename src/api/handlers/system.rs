//! System endpoints: health check and registry catalogs.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::api::dto::{ChainDto, CurrencyDto};
use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
    ws_subscribers: usize,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, current timestamp, and the number of live event subscribers.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ws_subscribers: state.event_bus.receiver_count(),
        }),
    )
}

/// `GET /config/currencies` — Payable currencies.
#[utoipa::path(
    get,
    path = "/config/currencies",
    tag = "System",
    summary = "List currencies",
    description = "Returns every currency a funding request can be denominated in, per network.",
    responses(
        (status = 200, description = "Currency catalog", body = Vec<CurrencyDto>),
    )
)]
pub async fn currencies_handler(State(state): State<AppState>) -> impl IntoResponse {
    let currencies: Vec<CurrencyDto> = state
        .funding_service
        .registries()
        .currencies
        .iter()
        .map(CurrencyDto::from)
        .collect();
    (StatusCode::OK, Json(currencies))
}

/// `GET /config/chains` — Storage chains.
#[utoipa::path(
    get,
    path = "/config/chains",
    tag = "System",
    summary = "List storage chains",
    responses(
        (status = 200, description = "Storage chain catalog", body = Vec<ChainDto>),
    )
)]
pub async fn chains_handler(State(state): State<AppState>) -> impl IntoResponse {
    let chains: Vec<ChainDto> = state
        .funding_service
        .registries()
        .chains
        .iter()
        .map(ChainDto::from)
        .collect();
    (StatusCode::OK, Json(chains))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/currencies", get(currencies_handler))
        .route("/config/chains", get(chains_handler))
}
