//! External collaborators: request store, payment processor, wallet.
//!
//! The gateway owns none of the durable state. Requests live in a request
//! store, balances and allowances on chain, and the caller's signing key in
//! their wallet. Each collaborator is a trait so the services can run
//! against the real network or the [`sandbox::InMemoryNetwork`].

pub mod sandbox;
pub mod wallet;

use async_trait::async_trait;

use crate::domain::request::{CreateRequestParams, RequestData};
use crate::domain::{Address, RequestId};

pub use sandbox::InMemoryNetwork;
pub use wallet::{Signer, WalletSession};

/// Failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetworkError {
    /// The store has no request with this identifier.
    #[error("request {0} not found in store")]
    RequestNotFound(String),

    /// The store refused the submission.
    #[error("store rejected request: {0}")]
    Rejected(String),

    /// A transaction was mined but reverted.
    #[error("transaction reverted: {0}")]
    Reverted(String),

    /// No transaction with this hash is known.
    #[error("unknown transaction {0}")]
    UnknownTransaction(String),

    /// Connectivity or protocol failure talking to the collaborator.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Receipt of a mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    /// Transaction hash.
    pub tx_hash: String,
    /// Confirmations observed when the wait returned.
    pub confirmations: u32,
}

/// Request-management collaborator.
///
/// Requests are append-only: there is no update or delete.
#[async_trait]
pub trait RequestStore: Send + Sync + std::fmt::Debug {
    /// Submits a new request and returns its identifier. The request is
    /// not durable until [`RequestStore::wait_for_confirmation`] returns.
    async fn create_request(&self, params: CreateRequestParams)
    -> Result<RequestId, NetworkError>;

    /// Blocks until the request is confirmed and returns its data.
    async fn wait_for_confirmation(&self, id: &RequestId) -> Result<RequestData, NetworkError>;

    /// Returns every request associated with `identity`, in no particular
    /// order.
    async fn from_identity(&self, identity: Address) -> Result<Vec<RequestData>, NetworkError>;

    /// Returns a single request.
    async fn from_request_id(&self, id: &RequestId) -> Result<RequestData, NetworkError>;
}

/// Payment-processor collaborator for ERC-20 fee-proxy requests.
#[async_trait]
pub trait PaymentProcessor: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `payer` holds enough tokens to pay what is still
    /// owed on `request`.
    async fn has_sufficient_funds(
        &self,
        request: &RequestData,
        payer: Address,
    ) -> Result<bool, NetworkError>;

    /// Returns `true` if `payer` has approved the proxy for at least the
    /// amount still owed on `request`.
    async fn has_erc20_approval(
        &self,
        request: &RequestData,
        payer: Address,
    ) -> Result<bool, NetworkError>;

    /// Submits an approval transaction and returns its hash.
    async fn approve_erc20(
        &self,
        request: &RequestData,
        signer: &Signer,
    ) -> Result<String, NetworkError>;

    /// Submits the payment transaction and returns its hash.
    async fn pay_request(&self, request: &RequestData, signer: &Signer)
    -> Result<String, NetworkError>;

    /// Blocks until `tx_hash` has `confirmations` confirmations.
    async fn wait_for_transaction(
        &self,
        tx_hash: &str,
        confirmations: u32,
    ) -> Result<TxReceipt, NetworkError>;
}
