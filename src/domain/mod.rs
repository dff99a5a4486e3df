//! Domain layer: identities, typed request payloads, registries, the
//! payment state machine, and the event system.
//!
//! Nothing in this module performs I/O. The service layer feeds
//! collaborator results into these types.

pub mod address;
pub mod amount;
pub mod content;
pub mod event_bus;
pub mod filter;
pub mod funding_event;
pub mod payment_flow;
pub mod registry;
pub mod request;
pub mod request_id;

pub use address::Address;
pub use content::{ContentKind, RequestContent};
pub use event_bus::EventBus;
pub use filter::RequestFilter;
pub use funding_event::FundingEvent;
pub use payment_flow::{PaymentFlow, PaymentStage};
pub use registry::Registries;
pub use request::{RequestData, TypedRequest};
pub use request_id::RequestId;
