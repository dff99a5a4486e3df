//! agrifund-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints against
//! the in-memory sandbox network.

use tracing_subscriber::EnvFilter;

use agrifund_gateway::api;
use agrifund_gateway::app_state::AppState;
use agrifund_gateway::config::GatewayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::from_env()?;
    let listen_addr = config.listen_addr;
    tracing::info!(
        addr = %listen_addr,
        marketplace = %config.marketplace_identity,
        confirmations = config.payment_confirmations,
        "starting agrifund-gateway"
    );

    let app = api::build_app(AppState::sandboxed(config));

    #[cfg(feature = "swagger-ui")]
    let app = {
        use utoipa::OpenApi;
        app.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api::ApiDoc::openapi()),
        )
    };

    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(addr = %listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
