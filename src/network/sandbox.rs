//! In-memory request store and payment processor.
//!
//! [`InMemoryNetwork`] keeps a single ledger of requests, ERC-20 balances,
//! allowances and transactions behind a [`tokio::sync::RwLock`]. It
//! confirms submissions instantly and mines every transaction with however
//! many confirmations the caller waits for. Payments are atomic: a
//! transfer either moves the full amount owed or reverts.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NetworkError, PaymentProcessor, RequestStore, Signer, TxReceipt};
use crate::domain::request::{Balance, CreateRequestParams, PaymentEntry, RequestData, RequestState};
use crate::domain::{Address, RequestId};

/// One holder's position in one token on one network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TokenAccount {
    owner: Address,
    network: String,
    token: Address,
}

impl TokenAccount {
    fn new(owner: Address, network: &str, token: Address) -> Self {
        Self {
            owner,
            network: network.to_ascii_lowercase(),
            token,
        }
    }

    fn for_request(owner: Address, request: &RequestData) -> Self {
        Self::new(owner, &request.currency.network, request.currency.token)
    }
}

#[derive(Debug, Default)]
struct Ledger {
    requests: HashMap<RequestId, RequestData>,
    /// Identity to request ids, in submission order.
    index: HashMap<Address, Vec<RequestId>>,
    balances: HashMap<TokenAccount, u128>,
    allowances: HashMap<TokenAccount, u128>,
    transactions: HashSet<String>,
}

impl Ledger {
    fn index_under(&mut self, identity: Address, id: &RequestId) {
        if identity.is_unset() {
            return;
        }
        let ids = self.index.entry(identity).or_default();
        if !ids.contains(id) {
            ids.push(id.clone());
        }
    }

    fn balance(&self, account: &TokenAccount) -> u128 {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn allowance(&self, account: &TokenAccount) -> u128 {
        self.allowances.get(account).copied().unwrap_or(0)
    }

    fn record_tx(&mut self) -> String {
        let hash = format!("0x{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        self.transactions.insert(hash.clone());
        hash
    }
}

/// Amount a payer must move to settle `request`: what is still owed plus
/// the fee.
fn amount_due(request: &RequestData) -> u128 {
    request
        .remaining()
        .saturating_add(request.payment_network.fee_amount)
}

/// Sandbox implementation of [`RequestStore`] and [`PaymentProcessor`].
#[derive(Debug, Default)]
pub struct InMemoryNetwork {
    ledger: RwLock<Ledger>,
}

impl InMemoryNetwork {
    /// Creates an empty network.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` tokens to `owner` and returns the new balance.
    pub async fn credit(&self, owner: Address, network: &str, token: Address, amount: u128) -> u128 {
        let mut ledger = self.ledger.write().await;
        let balance = ledger
            .balances
            .entry(TokenAccount::new(owner, network, token))
            .or_insert(0);
        *balance = balance.saturating_add(amount);
        tracing::debug!(%owner, network, %token, amount, "sandbox faucet credit");
        *balance
    }

    /// Token balance of `owner`.
    pub async fn balance_of(&self, owner: Address, network: &str, token: Address) -> u128 {
        self.ledger
            .read()
            .await
            .balance(&TokenAccount::new(owner, network, token))
    }

    /// Number of requests in the ledger.
    pub async fn request_count(&self) -> usize {
        self.ledger.read().await.requests.len()
    }
}

#[async_trait]
impl RequestStore for InMemoryNetwork {
    async fn create_request(
        &self,
        params: CreateRequestParams,
    ) -> Result<RequestId, NetworkError> {
        if params.signer.is_unset() {
            return Err(NetworkError::Rejected("request has no signer".to_string()));
        }
        let content_data = params
            .content
            .to_payload()
            .map_err(|e| NetworkError::Rejected(e.to_string()))?;

        let request_id = RequestId::generate();
        let data = RequestData {
            request_id: request_id.clone(),
            payee: params.payee,
            payer: params.payer,
            creator: params.signer,
            currency: params.currency,
            expected_amount: params.expected_amount,
            balance: Some(Balance::default()),
            content_data,
            payment_network: params.payment_network,
            timestamp: Utc::now(),
            state: RequestState::Pending,
        };

        let mut ledger = self.ledger.write().await;
        ledger.index_under(params.payee, &request_id);
        ledger.index_under(params.signer, &request_id);
        if let Some(payer) = params.payer {
            ledger.index_under(payer, &request_id);
        }
        for topic in params.topics {
            ledger.index_under(topic, &request_id);
        }
        ledger.requests.insert(request_id.clone(), data);
        tracing::debug!(%request_id, "sandbox request submitted");
        Ok(request_id)
    }

    async fn wait_for_confirmation(&self, id: &RequestId) -> Result<RequestData, NetworkError> {
        let mut ledger = self.ledger.write().await;
        let data = ledger
            .requests
            .get_mut(id)
            .ok_or_else(|| NetworkError::RequestNotFound(id.to_string()))?;
        data.state = RequestState::Created;
        Ok(data.clone())
    }

    async fn from_identity(&self, identity: Address) -> Result<Vec<RequestData>, NetworkError> {
        let ledger = self.ledger.read().await;
        let Some(ids) = ledger.index.get(&identity) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| ledger.requests.get(id))
            .cloned()
            .collect())
    }

    async fn from_request_id(&self, id: &RequestId) -> Result<RequestData, NetworkError> {
        self.ledger
            .read()
            .await
            .requests
            .get(id)
            .cloned()
            .ok_or_else(|| NetworkError::RequestNotFound(id.to_string()))
    }
}

#[async_trait]
impl PaymentProcessor for InMemoryNetwork {
    async fn has_sufficient_funds(
        &self,
        request: &RequestData,
        payer: Address,
    ) -> Result<bool, NetworkError> {
        let ledger = self.ledger.read().await;
        Ok(ledger.balance(&TokenAccount::for_request(payer, request)) >= amount_due(request))
    }

    async fn has_erc20_approval(
        &self,
        request: &RequestData,
        payer: Address,
    ) -> Result<bool, NetworkError> {
        let ledger = self.ledger.read().await;
        Ok(ledger.allowance(&TokenAccount::for_request(payer, request)) >= amount_due(request))
    }

    async fn approve_erc20(
        &self,
        request: &RequestData,
        signer: &Signer,
    ) -> Result<String, NetworkError> {
        let mut ledger = self.ledger.write().await;
        ledger
            .allowances
            .insert(TokenAccount::for_request(signer.address(), request), u128::MAX);
        let tx_hash = ledger.record_tx();
        tracing::debug!(request_id = %request.request_id, %tx_hash, "sandbox approval mined");
        Ok(tx_hash)
    }

    async fn pay_request(
        &self,
        request: &RequestData,
        signer: &Signer,
    ) -> Result<String, NetworkError> {
        let payer = signer.address();
        let mut ledger = self.ledger.write().await;
        let stored = ledger
            .requests
            .get(&request.request_id)
            .cloned()
            .ok_or_else(|| NetworkError::RequestNotFound(request.request_id.to_string()))?;

        let owed = stored.remaining();
        if owed == 0 {
            return Err(NetworkError::Reverted("request already paid".to_string()));
        }
        let fee = stored.payment_network.fee_amount;
        let due = amount_due(&stored);

        let from = TokenAccount::for_request(payer, &stored);
        let balance = ledger.balance(&from);
        if balance < due {
            return Err(NetworkError::Reverted("transfer amount exceeds balance".to_string()));
        }
        let allowance = ledger.allowance(&from);
        if allowance < due {
            return Err(NetworkError::Reverted("insufficient allowance".to_string()));
        }

        ledger.balances.insert(from.clone(), balance - due);
        if allowance != u128::MAX {
            ledger.allowances.insert(from, allowance - due);
        }
        let to = TokenAccount::for_request(stored.payment_network.payment_address, &stored);
        let credited = ledger.balance(&to).saturating_add(owed);
        ledger.balances.insert(to, credited);
        if fee > 0 {
            let fee_to = TokenAccount::for_request(stored.payment_network.fee_address, &stored);
            let credited = ledger.balance(&fee_to).saturating_add(fee);
            ledger.balances.insert(fee_to, credited);
        }

        let tx_hash = ledger.record_tx();
        if let Some(data) = ledger.requests.get_mut(&stored.request_id) {
            let balance = data.balance.get_or_insert_with(Balance::default);
            balance.paid = balance.paid.saturating_add(owed);
            balance.payments.push(PaymentEntry {
                payer,
                amount: owed,
                tx_hash: tx_hash.clone(),
                timestamp: Utc::now(),
            });
        }
        ledger.index_under(payer, &stored.request_id);
        tracing::debug!(request_id = %stored.request_id, %payer, amount = owed, %tx_hash, "sandbox payment mined");
        Ok(tx_hash)
    }

    async fn wait_for_transaction(
        &self,
        tx_hash: &str,
        confirmations: u32,
    ) -> Result<TxReceipt, NetworkError> {
        let ledger = self.ledger.read().await;
        if !ledger.transactions.contains(tx_hash) {
            return Err(NetworkError::UnknownTransaction(tx_hash.to_string()));
        }
        Ok(TxReceipt {
            tx_hash: tx_hash.to_string(),
            confirmations,
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::request::fixtures::{funding_content, sepolia_dai};
    use crate::domain::request::PaymentNetwork;
    use crate::network::WalletSession;

    const FARMER: Address = Address::from_bytes([1u8; 20]);
    const INVESTOR: Address = Address::from_bytes([2u8; 20]);
    const MARKET: Address = Address::from_bytes([9u8; 20]);

    fn params(expected: u128) -> CreateRequestParams {
        CreateRequestParams {
            currency: sepolia_dai(),
            expected_amount: expected,
            payee: FARMER,
            payer: None,
            payment_network: PaymentNetwork::fee_free(FARMER),
            content: funding_content("42", FARMER),
            signer: FARMER,
            topics: vec![MARKET],
        }
    }

    fn investor_signer() -> Signer {
        let Ok(signer) = WalletSession::connected(INVESTOR, "sepolia").signer() else {
            panic!("connected wallet has a signer");
        };
        signer
    }

    async fn confirmed(network: &InMemoryNetwork, expected: u128) -> RequestData {
        let Ok(id) = network.create_request(params(expected)).await else {
            panic!("create should succeed");
        };
        let Ok(data) = network.wait_for_confirmation(&id).await else {
            panic!("confirmation should succeed");
        };
        data
    }

    #[tokio::test]
    async fn submission_is_pending_until_confirmed() {
        let network = InMemoryNetwork::new();
        let Ok(id) = network.create_request(params(100)).await else {
            panic!("create should succeed");
        };
        let Ok(pending) = network.from_request_id(&id).await else {
            panic!("request exists");
        };
        assert_eq!(pending.state, RequestState::Pending);

        let Ok(created) = network.wait_for_confirmation(&id).await else {
            panic!("confirmation should succeed");
        };
        assert_eq!(created.state, RequestState::Created);
        assert_eq!(created.request_id, id);
    }

    #[tokio::test]
    async fn indexes_payee_and_topics() {
        let network = InMemoryNetwork::new();
        let data = confirmed(&network, 100).await;

        for identity in [FARMER, MARKET] {
            let Ok(found) = network.from_identity(identity).await else {
                panic!("lookup should succeed");
            };
            assert_eq!(found.len(), 1);
            assert_eq!(found.first().map(|d| &d.request_id), Some(&data.request_id));
        }
        let Ok(none) = network.from_identity(INVESTOR).await else {
            panic!("lookup should succeed");
        };
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn unsigned_submission_is_rejected() {
        let network = InMemoryNetwork::new();
        let mut p = params(100);
        p.signer = Address::ZERO;
        assert!(matches!(
            network.create_request(p).await,
            Err(NetworkError::Rejected(_))
        ));
        assert_eq!(network.request_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let network = InMemoryNetwork::new();
        let id = RequestId::generate();
        assert!(matches!(
            network.from_request_id(&id).await,
            Err(NetworkError::RequestNotFound(_))
        ));
    }

    #[tokio::test]
    async fn funds_and_approval_checks_follow_the_ledger() {
        let network = InMemoryNetwork::new();
        let data = confirmed(&network, 100).await;

        assert_eq!(network.has_sufficient_funds(&data, INVESTOR).await, Ok(false));
        network
            .credit(INVESTOR, "sepolia", data.currency.token, 100)
            .await;
        assert_eq!(network.has_sufficient_funds(&data, INVESTOR).await, Ok(true));

        assert_eq!(network.has_erc20_approval(&data, INVESTOR).await, Ok(false));
        let Ok(tx) = network.approve_erc20(&data, &investor_signer()).await else {
            panic!("approval should succeed");
        };
        assert!(network.wait_for_transaction(&tx, 2).await.is_ok());
        assert_eq!(network.has_erc20_approval(&data, INVESTOR).await, Ok(true));
    }

    #[tokio::test]
    async fn payment_moves_tokens_and_records_balance() {
        let network = InMemoryNetwork::new();
        let data = confirmed(&network, 100).await;
        let token = data.currency.token;
        network.credit(INVESTOR, "sepolia", token, 150).await;
        let signer = investor_signer();
        assert!(network.approve_erc20(&data, &signer).await.is_ok());

        let Ok(tx) = network.pay_request(&data, &signer).await else {
            panic!("payment should succeed");
        };
        let Ok(receipt) = network.wait_for_transaction(&tx, 2).await else {
            panic!("payment tx is known");
        };
        assert_eq!(receipt.confirmations, 2);

        assert_eq!(network.balance_of(INVESTOR, "sepolia", token).await, 50);
        assert_eq!(network.balance_of(FARMER, "sepolia", token).await, 100);

        let Ok(paid) = network.from_request_id(&data.request_id).await else {
            panic!("request exists");
        };
        assert!(paid.is_fully_funded());
        assert_eq!(paid.first_payer(), Some(INVESTOR));

        let Ok(investor_view) = network.from_identity(INVESTOR).await else {
            panic!("lookup should succeed");
        };
        assert_eq!(investor_view.len(), 1);

        assert!(matches!(
            network.pay_request(&paid, &signer).await,
            Err(NetworkError::Reverted(_))
        ));
    }

    #[tokio::test]
    async fn payment_without_allowance_reverts() {
        let network = InMemoryNetwork::new();
        let data = confirmed(&network, 100).await;
        network
            .credit(INVESTOR, "sepolia", data.currency.token, 100)
            .await;
        assert!(matches!(
            network.pay_request(&data, &investor_signer()).await,
            Err(NetworkError::Reverted(_))
        ));
        assert_eq!(
            network
                .balance_of(INVESTOR, "sepolia", data.currency.token)
                .await,
            100
        );
    }

    #[tokio::test]
    async fn unknown_transaction_errors() {
        let network = InMemoryNetwork::new();
        assert!(matches!(
            network.wait_for_transaction("0xdead", 2).await,
            Err(NetworkError::UnknownTransaction(_))
        ));
    }
}
