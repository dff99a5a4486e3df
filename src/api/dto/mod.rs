//! Data Transfer Objects for REST request/response serialization.
//!
//! All token amounts are serialized as JSON strings to prevent
//! precision loss on u128 values.

pub mod common_dto;
pub mod payment_dto;
pub mod request_dto;

pub use common_dto::*;
pub use payment_dto::*;
pub use request_dto::*;
