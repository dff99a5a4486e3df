//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::domain::{EventBus, Registries};
use crate::network::{InMemoryNetwork, PaymentProcessor, RequestStore};
use crate::service::{FundingService, PaymentService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Request creation, records and listings.
    pub funding_service: Arc<FundingService>,
    /// Investments and return payments.
    pub payment_service: Arc<PaymentService>,
    /// Sandbox ledger backing both collaborators, for the faucet.
    pub sandbox: Arc<InMemoryNetwork>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Runtime configuration.
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Wires services against a fresh [`InMemoryNetwork`].
    #[must_use]
    pub fn sandboxed(config: GatewayConfig) -> Self {
        let sandbox = Arc::new(InMemoryNetwork::new());
        let event_bus = EventBus::new(config.event_bus_capacity);
        let funding_service = FundingService::new(
            Arc::clone(&sandbox) as Arc<dyn RequestStore>,
            Arc::new(Registries::default_catalog()),
            event_bus.clone(),
            config.marketplace_identity,
        );
        let payment_service = PaymentService::new(
            funding_service.clone(),
            Arc::clone(&sandbox) as Arc<dyn PaymentProcessor>,
            event_bus.clone(),
            config.payment_confirmations,
        );
        Self {
            funding_service: Arc::new(funding_service),
            payment_service: Arc::new(payment_service),
            sandbox,
            event_bus,
            config: Arc::new(config),
        }
    }
}
