//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.
//! Every error is reported once at its point of origin; nothing is retried.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::network::NetworkError;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4002,
///     "message": "insufficient funds to pay request 01ab…",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see the table on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category              | HTTP Status                       |
/// |-----------|-----------------------|-----------------------------------|
/// | 1000–1999 | Validation / Config   | 400 Bad Request                   |
/// | 1100–1199 | Caller identity       | 401 Unauthorized / 403 Forbidden  |
/// | 2000–2999 | Not Found             | 404 Not Found                     |
/// | 3000–3999 | Server / Collaborator | 500 / 502                         |
/// | 4000–4999 | Payment               | 409 Conflict / 422 Unprocessable  |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A required field is missing or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// An address could not be parsed.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// An amount is zero, negative, or not representable in token units.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Currency or chain lookup missed the configured registries.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No wallet (or no signer) is connected for the caller.
    #[error("no wallet connected")]
    WalletNotConnected,

    /// The caller is not allowed to act on this request.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Request with the given identifier was not found.
    #[error("request not found: {0}")]
    RequestNotFound(String),

    /// The request's currency network differs from the wallet network.
    #[error("network mismatch: request is on {expected}, wallet is on {actual}")]
    NetworkMismatch {
        /// Network the request must be paid on.
        expected: String,
        /// Network the wallet is currently connected to.
        actual: String,
    },

    /// The payer's balance does not cover the amount due.
    #[error("insufficient funds to pay request {0}")]
    InsufficientFunds(String),

    /// The content payload carries an unknown or unexpected discriminator.
    #[error("unexpected content type: {0}")]
    UnexpectedContent(String),

    /// The payment state machine refused a transition.
    #[error("invalid payment transition from {from} on {event}")]
    InvalidTransition {
        /// Stage the flow was in.
        from: String,
        /// Event that was applied.
        event: String,
    },

    /// Error propagated from the request store or payment processor.
    #[error("submission error: {0}")]
    Network(#[from] NetworkError),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidAddress(_) => 1002,
            Self::InvalidAmount(_) => 1003,
            Self::Configuration(_) => 1004,
            Self::WalletNotConnected => 1101,
            Self::Forbidden(_) => 1102,
            Self::RequestNotFound(_) => 2001,
            Self::Internal(_) => 3000,
            Self::InvalidTransition { .. } => 3001,
            Self::Network(_) => 3002,
            Self::NetworkMismatch { .. } => 4001,
            Self::InsufficientFunds(_) => 4002,
            Self::UnexpectedContent(_) => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_)
            | Self::InvalidAddress(_)
            | Self::InvalidAmount(_)
            | Self::Configuration(_) => StatusCode::BAD_REQUEST,
            Self::WalletNotConnected => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::RequestNotFound(_) | Self::Network(NetworkError::RequestNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::NetworkMismatch { .. } => StatusCode::CONFLICT,
            Self::InsufficientFunds(_) | Self::UnexpectedContent(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Network(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidTransition { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn wallet_errors_are_unauthorized() {
        let err = GatewayError::WalletNotConnected;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.error_code(), 1101);
    }

    #[test]
    fn unknown_request_is_not_found() {
        let err = GatewayError::RequestNotFound("01ff".to_string());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 2001);
    }

    #[test]
    fn missing_request_from_store_maps_to_not_found() {
        let err = GatewayError::from(NetworkError::RequestNotFound("01ff".to_string()));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.error_code(), 3002);
    }

    #[test]
    fn other_collaborator_failures_are_bad_gateway() {
        let err = GatewayError::from(NetworkError::Reverted("allowance".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.to_string().starts_with("submission error"));
    }

    #[test]
    fn network_mismatch_message_names_both_networks() {
        let err = GatewayError::NetworkMismatch {
            expected: "sepolia".to_string(),
            actual: "mainnet".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let msg = err.to_string();
        assert!(msg.contains("sepolia"));
        assert!(msg.contains("mainnet"));
    }
}
