//! Funding-record handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{CreateRecordBody, RequestDto, RequestListResponse};
use crate::app_state::AppState;
use crate::domain::RequestId;
use crate::error::{ErrorResponse, GatewayError};
use crate::network::WalletSession;

/// `POST /requests/{id}/records` — Append a progress record.
///
/// # Errors
///
/// Returns [`GatewayError`] if the caller is not the farmer, the text is
/// empty, or submission fails.
#[utoipa::path(
    post,
    path = "/api/v1/requests/{id}/records",
    tag = "Records",
    summary = "Add a funding record",
    params(
        ("id" = String, Path, description = "Funding request identifier"),
    ),
    request_body = CreateRecordBody,
    responses(
        (status = 201, description = "Record confirmed", body = RequestDto),
        (status = 401, description = "No wallet connected", body = ErrorResponse),
        (status = 403, description = "Caller is not the farmer", body = ErrorResponse),
        (status = 404, description = "Funding request not found", body = ErrorResponse),
    )
)]
pub async fn add_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
    wallet: WalletSession,
    Json(body): Json<CreateRecordBody>,
) -> Result<impl IntoResponse, GatewayError> {
    let id: RequestId = id.parse()?;
    let record = state
        .funding_service
        .add_record(&wallet, &id, &body.record)
        .await?;
    Ok((StatusCode::CREATED, Json(RequestDto::from(&record))))
}

/// `GET /requests/{id}/records` — Records of a funding request, newest
/// first.
///
/// # Errors
///
/// Returns [`GatewayError`] if the funding request is unknown.
#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}/records",
    tag = "Records",
    summary = "List funding records",
    params(
        ("id" = String, Path, description = "Funding request identifier"),
    ),
    responses(
        (status = 200, description = "Records, newest first", body = RequestListResponse),
        (status = 404, description = "Funding request not found", body = ErrorResponse),
    )
)]
pub async fn list_records(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let id: RequestId = id.parse()?;
    let records = state.funding_service.records_for(&id).await?;
    Ok(Json(RequestListResponse::from_requests(&records)))
}

/// Record routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/requests/{id}/records", get(list_records).post(add_record))
}
