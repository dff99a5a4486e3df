//! # agrifund-gateway
//!
//! REST API and WebSocket gateway for a crop and livestock funding
//! marketplace.
//!
//! Farmers publish funding requests, investors pay them, farmers append
//! progress records and finally repay the investor through a
//! return-investment request. Requests and payments live in an external
//! request network; this service is a coordination layer over the
//! [`network::RequestStore`] and [`network::PaymentProcessor`] seams.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── FundingService, PaymentService (service/)
//!     ├── EventBus, PaymentFlow, typed content (domain/)
//!     │
//!     └── RequestStore + PaymentProcessor (network/)
//!             └── InMemoryNetwork sandbox
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod network;
pub mod service;
pub mod ws;
