//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Resource endpoints are mounted under `/api/v1`; health and registry
//! catalogs at the root. The caller's wallet travels in the
//! `X-Wallet-Address` and `X-Wallet-Network` headers.

pub mod dto;
pub mod handlers;
pub mod wallet;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::error::{ErrorBody, ErrorResponse};
use crate::ws::handler::ws_handler;

/// OpenAPI description of every REST endpoint.
#[derive(Debug, utoipa::OpenApi)]
#[openapi(
    info(
        title = "agrifund-gateway",
        description = "Funding-request lifecycle gateway for a crop and livestock investment marketplace."
    ),
    paths(
        handlers::requests::create_request,
        handlers::requests::get_request,
        handlers::requests::list_requests,
        handlers::requests::explore,
        handlers::requests::farm,
        handlers::requests::investments,
        handlers::records::add_record,
        handlers::records::list_records,
        handlers::payments::invest,
        handlers::payments::return_investment,
        handlers::sandbox::faucet,
        handlers::system::health_handler,
        handlers::system::currencies_handler,
        handlers::system::chains_handler,
    ),
    components(schemas(ErrorResponse, ErrorBody)),
    tags(
        (name = "Requests", description = "Funding request creation and lookup"),
        (name = "Views", description = "Marketplace, farm and investment listings"),
        (name = "Records", description = "Farmer progress records"),
        (name = "Payments", description = "Investments and returns"),
        (name = "Sandbox", description = "In-memory network helpers"),
        (name = "System", description = "Health and configuration"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST, WebSocket, tracing and CORS.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::api::wallet::{WALLET_ADDRESS_HEADER, WALLET_NETWORK_HEADER};
    use crate::config::GatewayConfig;

    const FARMER: &str = "0x1111111111111111111111111111111111111111";
    const INVESTOR: &str = "0x2222222222222222222222222222222222222222";

    fn app() -> Router {
        build_app(AppState::sandboxed(GatewayConfig::default()))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let Ok(response) = app.clone().oneshot(request).await;
        let status = response.status();
        let Ok(collected) = response.into_body().collect().await else {
            panic!("body should collect");
        };
        let body = serde_json::from_slice(&collected.to_bytes()).unwrap_or(Value::Null);
        (status, body)
    }

    fn post(uri: &str, wallet: Option<&str>, body: &Value) -> Request<Body> {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if let Some(address) = wallet {
            builder = builder
                .header(WALLET_ADDRESS_HEADER, address)
                .header(WALLET_NETWORK_HEADER, "sepolia");
        }
        let Ok(request) = builder.body(Body::from(body.to_string())) else {
            panic!("request should build");
        };
        request
    }

    fn get_req(uri: &str, wallet: Option<&str>) -> Request<Body> {
        let mut builder = Request::get(uri);
        if let Some(address) = wallet {
            builder = builder
                .header(WALLET_ADDRESS_HEADER, address)
                .header(WALLET_NETWORK_HEADER, "sepolia");
        }
        let Ok(request) = builder.body(Body::empty()) else {
            panic!("request should build");
        };
        request
    }

    fn maize() -> Value {
        json!({
            "category": "Grains",
            "description": "Maize, two hectares",
            "identifier": "maize-2026",
            "chain": "sepolia",
            "currency": "DAI",
            "investment_amount": "320",
            "expected_return_amount": "480",
            "expected_return_period": "6m",
            "passport_image": {
                "uri": "ipfs://passport",
                "content_type": "image/jpeg",
                "size_bytes": 2048
            }
        })
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = send(&app(), get_req("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn currency_catalog_lists_sepolia_dai() {
        let (status, body) = send(&app(), get_req("/config/currencies", None)).await;
        assert_eq!(status, StatusCode::OK);
        let Some(list) = body.as_array() else {
            panic!("expected array");
        };
        assert!(
            list.iter()
                .any(|c| c["symbol"] == "DAI" && c["network"] == "sepolia" && c["decimals"] == 18)
        );
    }

    #[tokio::test]
    async fn create_requires_wallet() {
        let (status, body) = send(&app(), post("/api/v1/requests", None, &maize())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], 1101);
    }

    #[tokio::test]
    async fn create_rejects_unknown_currency() {
        let mut input = maize();
        input["currency"] = json!("EUR");
        let (status, body) = send(&app(), post("/api/v1/requests", Some(FARMER), &input)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1004);
    }

    #[tokio::test]
    async fn create_then_fetch_echoes_content() {
        let app = app();
        let (status, created) = send(&app, post("/api/v1/requests", Some(FARMER), &maize())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["kind"], "Funding-Request");
        assert_eq!(created["state"], "created");
        assert_eq!(created["expected_amount"], "320000000000000000000");
        assert_eq!(created["content"]["investmentAmount"], "320");
        assert_eq!(created["content"]["expectedReturnAmount"], "480");
        assert_eq!(created["content"]["farmerAddress"], FARMER);

        let Some(id) = created["request_id"].as_str() else {
            panic!("request_id should be a string");
        };
        let (status, detail) = send(&app, get_req(&format!("/api/v1/requests/{id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["status"], "available");

        let (_, explore) = send(&app, get_req("/api/v1/explore?available=true", None)).await;
        assert_eq!(explore["total"], 1);
    }

    #[tokio::test]
    async fn listing_without_identity_is_empty() {
        let app = app();
        let _ = send(&app, post("/api/v1/requests", Some(FARMER), &maize())).await;
        let (status, body) = send(&app, get_req("/api/v1/requests", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);

        let uri = format!("/api/v1/requests?identity={FARMER}&kind=Funding-Request");
        let (_, body) = send(&app, get_req(&uri, None)).await;
        assert_eq!(body["total"], 1);

        let uri = format!("/api/v1/requests?identity={FARMER}&kind=Funding-Record");
        let (_, body) = send(&app, get_req(&uri, None)).await;
        assert_eq!(body["total"], 0);

        let uri = format!("/api/v1/requests?identity={FARMER}&kind=Invoice");
        let (status, body) = send(&app, get_req(&uri, None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 1001);
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let (status, body) = send(&app(), get_req("/api/v1/requests/01abcdef", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 2001);
    }

    #[tokio::test]
    async fn invest_flow_over_http() {
        let app = app();
        let (_, created) = send(&app, post("/api/v1/requests", Some(FARMER), &maize())).await;
        let Some(id) = created["request_id"].as_str().map(str::to_string) else {
            panic!("request_id should be a string");
        };
        let invest_uri = format!("/api/v1/requests/{id}/invest");

        let (status, body) = send(&app, post(&invest_uri, Some(INVESTOR), &json!({}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], 4002);

        let faucet = json!({
            "address": INVESTOR,
            "network": "sepolia",
            "currency": "DAI",
            "amount": "320"
        });
        let (status, body) = send(&app, post("/api/v1/sandbox/faucet", None, &faucet)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["balance"], "320000000000000000000");

        let (status, body) = send(&app, post(&invest_uri, Some(INVESTOR), &json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stage"], "confirmed");
        assert!(body["approval_tx"].is_string());

        let (_, investments) = send(&app, get_req("/api/v1/investments", Some(INVESTOR))).await;
        assert_eq!(investments["total"], 1);
    }

    #[tokio::test]
    async fn records_round_trip_over_http() {
        let app = app();
        let (_, created) = send(&app, post("/api/v1/requests", Some(FARMER), &maize())).await;
        let Some(id) = created["request_id"].as_str().map(str::to_string) else {
            panic!("request_id should be a string");
        };
        let uri = format!("/api/v1/requests/{id}/records");

        let (status, _) = send(&app, post(&uri, Some(INVESTOR), &json!({"record": "x"}))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, record) =
            send(&app, post(&uri, Some(FARMER), &json!({"record": "sowed 2 ha"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(record["kind"], "Funding-Record");

        let (status, list) = send(&app, get_req(&uri, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["total"], 1);
        assert_eq!(list["data"][0]["content"]["record"], "sowed 2 ha");
    }
}
