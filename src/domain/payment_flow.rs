//! Payment state machine shared by investments and return investments.
//!
//! ```text
//! Idle ─► CheckingFunds ─► CheckingApproval ─┬────────────► Paying ─► Confirmed
//!   │           │                 │          └► Approving ─►  │
//!   └───────────┴─────────────────┴───────────────┴───────────┴─────► Failed
//! ```
//!
//! [`PaymentFlow`] owns no I/O. The payment service performs each
//! collaborator call and feeds its outcome into the matching transition;
//! the flow refuses anything out of order. `Confirmed` and `Failed` are
//! terminal.

use std::fmt;

use serde::Serialize;

use super::RequestId;
use crate::error::GatewayError;

/// Stage of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStage {
    /// Pre-checks (amount, network) not yet passed.
    Idle,
    /// Waiting on the balance check.
    CheckingFunds,
    /// Waiting on the allowance check.
    CheckingApproval,
    /// Approval transaction submitted, waiting for confirmations.
    Approving,
    /// Payment transaction submitted, waiting for confirmations.
    Paying,
    /// Payment confirmed.
    Confirmed,
    /// Flow aborted.
    Failed,
}

impl PaymentStage {
    /// Returns `true` for `Confirmed` and `Failed`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }

    /// Returns the stage name as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CheckingFunds => "checking_funds",
            Self::CheckingApproval => "checking_approval",
            Self::Approving => "approving",
            Self::Paying => "paying",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory record of one payment attempt.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentFlow {
    request_id: RequestId,
    stage: PaymentStage,
    history: Vec<PaymentStage>,
    approval_tx: Option<String>,
    payment_tx: Option<String>,
    failure: Option<String>,
}

impl PaymentFlow {
    /// Starts a flow in [`PaymentStage::Idle`].
    #[must_use]
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            stage: PaymentStage::Idle,
            history: vec![PaymentStage::Idle],
            approval_tx: None,
            payment_tx: None,
            failure: None,
        }
    }

    /// Request being paid.
    #[must_use]
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// Current stage.
    #[must_use]
    pub const fn stage(&self) -> PaymentStage {
        self.stage
    }

    /// Every stage visited, in order, starting with `Idle`.
    #[must_use]
    pub fn history(&self) -> &[PaymentStage] {
        &self.history
    }

    /// Approval transaction hash, if an approval was needed.
    #[must_use]
    pub fn approval_tx(&self) -> Option<&str> {
        self.approval_tx.as_deref()
    }

    /// Payment transaction hash once confirmed.
    #[must_use]
    pub fn payment_tx(&self) -> Option<&str> {
        self.payment_tx.as_deref()
    }

    /// Failure reason once failed.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Pre-checks passed: `Idle → CheckingFunds`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] outside `Idle`.
    pub fn begin(&mut self) -> Result<PaymentStage, GatewayError> {
        self.require_stage(PaymentStage::Idle, "begin")?;
        Ok(self.advance(PaymentStage::CheckingFunds))
    }

    /// Balance check returned: `CheckingFunds → CheckingApproval | Failed`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] outside `CheckingFunds`.
    pub fn funds_checked(&mut self, sufficient: bool) -> Result<PaymentStage, GatewayError> {
        self.require_stage(PaymentStage::CheckingFunds, "funds_checked")?;
        if sufficient {
            Ok(self.advance(PaymentStage::CheckingApproval))
        } else {
            self.failure = Some("insufficient funds".to_string());
            Ok(self.advance(PaymentStage::Failed))
        }
    }

    /// Allowance check returned: `CheckingApproval → Paying | Approving`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] outside
    /// `CheckingApproval`.
    pub fn approval_checked(&mut self, approved: bool) -> Result<PaymentStage, GatewayError> {
        self.require_stage(PaymentStage::CheckingApproval, "approval_checked")?;
        if approved {
            Ok(self.advance(PaymentStage::Paying))
        } else {
            Ok(self.advance(PaymentStage::Approving))
        }
    }

    /// Approval confirmed: `Approving → Paying`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] outside `Approving`.
    pub fn approval_confirmed(&mut self, tx_hash: &str) -> Result<PaymentStage, GatewayError> {
        self.require_stage(PaymentStage::Approving, "approval_confirmed")?;
        self.approval_tx = Some(tx_hash.to_string());
        Ok(self.advance(PaymentStage::Paying))
    }

    /// Payment confirmed: `Paying → Confirmed`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] outside `Paying`.
    pub fn payment_confirmed(&mut self, tx_hash: &str) -> Result<PaymentStage, GatewayError> {
        self.require_stage(PaymentStage::Paying, "payment_confirmed")?;
        self.payment_tx = Some(tx_hash.to_string());
        Ok(self.advance(PaymentStage::Confirmed))
    }

    /// Aborts from any non-terminal stage.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidTransition`] from a terminal stage.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<PaymentStage, GatewayError> {
        if self.stage.is_terminal() {
            return Err(self.refuse("fail"));
        }
        self.failure = Some(reason.into());
        Ok(self.advance(PaymentStage::Failed))
    }

    fn require_stage(&self, stage: PaymentStage, event: &str) -> Result<(), GatewayError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(self.refuse(event))
        }
    }

    fn refuse(&self, event: &str) -> GatewayError {
        GatewayError::InvalidTransition {
            from: self.stage.to_string(),
            event: event.to_string(),
        }
    }

    fn advance(&mut self, next: PaymentStage) -> PaymentStage {
        tracing::debug!(request_id = %self.request_id, from = %self.stage, to = %next, "payment stage");
        self.stage = next;
        self.history.push(next);
        next
    }
}
