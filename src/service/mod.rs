//! Service layer: business logic orchestration.
//!
//! [`FundingService`] creates and lists requests through the
//! [`crate::network::RequestStore`]; [`PaymentService`] runs payments
//! through the [`crate::network::PaymentProcessor`]. Both emit events
//! through the [`super::domain::EventBus`].

pub mod funding_service;
pub mod payment_service;
pub mod validation;

pub use funding_service::{FundingService, RequestDetail};
pub use payment_service::{PaymentService, ReturnOutcome};
pub use validation::{NewFundingRequest, PassportImage};
