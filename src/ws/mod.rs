//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` streams [`crate::domain::FundingEvent`]s for the
//! request ids a client subscribed to, and answers `get_request` lookups.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
