//! Funding-request handlers: create, get, list, and the named views.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{
    CreateFundingRequestBody, ExploreQuery, ListRequestsQuery, RequestDto, RequestListResponse,
};
use crate::app_state::AppState;
use crate::domain::RequestId;
use crate::error::{ErrorResponse, GatewayError};
use crate::network::WalletSession;
use crate::service::NewFundingRequest;

/// `POST /requests` — Create a funding request.
///
/// # Errors
///
/// Returns [`GatewayError`] on invalid input, missing wallet, unknown
/// currency/chain, or submission failure.
#[utoipa::path(
    post,
    path = "/api/v1/requests",
    tag = "Requests",
    summary = "Create a funding request",
    description = "Submits a Funding-Request for the connected farmer and blocks until the store confirms it. Requires the X-Wallet-Address header.",
    request_body = CreateFundingRequestBody,
    responses(
        (status = 201, description = "Request confirmed", body = RequestDto),
        (status = 400, description = "Invalid input or configuration", body = ErrorResponse),
        (status = 401, description = "No wallet connected", body = ErrorResponse),
        (status = 502, description = "Request store failed", body = ErrorResponse),
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    wallet: WalletSession,
    Json(body): Json<CreateFundingRequestBody>,
) -> Result<impl IntoResponse, GatewayError> {
    let input = NewFundingRequest::try_from(body)?;
    let request = state
        .funding_service
        .create_funding_request(&wallet, input)
        .await?;
    Ok((StatusCode::CREATED, Json(RequestDto::from(&request))))
}

/// `GET /requests/{id}` — Get a request with its lifecycle status.
///
/// # Errors
///
/// Returns [`GatewayError`] if the request is unknown or its payload is
/// unreadable.
#[utoipa::path(
    get,
    path = "/api/v1/requests/{id}",
    tag = "Requests",
    summary = "Get request details",
    description = "Returns a single typed request. Funding requests include their derived status.",
    params(
        ("id" = String, Path, description = "Request identifier"),
    ),
    responses(
        (status = 200, description = "Request details", body = RequestDto),
        (status = 404, description = "Request not found", body = ErrorResponse),
        (status = 422, description = "Unreadable payload", body = ErrorResponse),
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let id: RequestId = id.parse()?;
    let detail = state.funding_service.detail(&id).await?;
    Ok(Json(RequestDto::from(&detail)))
}

/// `GET /requests` — List requests for an identity.
///
/// # Errors
///
/// Returns [`GatewayError`] on malformed query values or store failure.
#[utoipa::path(
    get,
    path = "/api/v1/requests",
    tag = "Requests",
    summary = "List requests",
    description = "Fetches every request associated with `identity`, skips unreadable payloads, and applies the filters. Without an identity the list is empty.",
    params(ListRequestsQuery),
    responses(
        (status = 200, description = "Matching requests", body = RequestListResponse),
        (status = 400, description = "Malformed query", body = ErrorResponse),
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListRequestsQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let (identity, filter) = query.into_filter()?;
    let requests = state
        .funding_service
        .list_for_identity(identity, &filter)
        .await?;
    Ok(Json(RequestListResponse::from_requests(&requests)))
}

/// `GET /explore` — Funding requests listed on the marketplace.
///
/// # Errors
///
/// Returns [`GatewayError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/explore",
    tag = "Views",
    summary = "Explore marketplace",
    params(ExploreQuery),
    responses(
        (status = 200, description = "Marketplace funding requests", body = RequestListResponse),
    )
)]
pub async fn explore(
    State(state): State<AppState>,
    Query(query): Query<ExploreQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let requests = state
        .funding_service
        .explore(query.available.unwrap_or(false))
        .await?;
    Ok(Json(RequestListResponse::from_requests(&requests)))
}

/// `GET /farm` — Funding requests created by the caller.
///
/// # Errors
///
/// Returns [`GatewayError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/farm",
    tag = "Views",
    summary = "My farm",
    description = "Funding requests whose farmer is the connected wallet. Empty without a wallet.",
    responses(
        (status = 200, description = "Caller's funding requests", body = RequestListResponse),
    )
)]
pub async fn farm(
    State(state): State<AppState>,
    wallet: WalletSession,
) -> Result<impl IntoResponse, GatewayError> {
    let requests = state.funding_service.farm(&wallet).await?;
    Ok(Json(RequestListResponse::from_requests(&requests)))
}

/// `GET /investments` — Funding requests the caller invested in.
///
/// # Errors
///
/// Returns [`GatewayError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/v1/investments",
    tag = "Views",
    summary = "My investments",
    description = "Fully funded funding requests whose investor is the connected wallet. Empty without a wallet.",
    responses(
        (status = 200, description = "Caller's investments", body = RequestListResponse),
    )
)]
pub async fn investments(
    State(state): State<AppState>,
    wallet: WalletSession,
) -> Result<impl IntoResponse, GatewayError> {
    let requests = state.funding_service.investments(&wallet).await?;
    Ok(Json(RequestListResponse::from_requests(&requests)))
}

/// Request routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/{id}", get(get_request))
        .route("/explore", get(explore))
        .route("/farm", get(farm))
        .route("/investments", get(investments))
}
