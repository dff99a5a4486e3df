//! Domain events reflecting the funding lifecycle.
//!
//! Every completed submission and every payment stage transition emits a
//! [`FundingEvent`] through the [`super::EventBus`]. Events are broadcast
//! to WebSocket subscribers; they are the gateway's transient
//! notifications and are never persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::RequestId;
use super::content::ContentKind;
use super::payment_flow::PaymentStage;

/// Domain event emitted after every lifecycle step.
///
/// Amounts are stored as `String` to preserve u128 precision when
/// serialized to JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum FundingEvent {
    /// Emitted when a funding request or return investment is confirmed.
    RequestCreated {
        /// Request identifier.
        request_id: RequestId,
        /// Content discriminator.
        kind: ContentKind,
        /// Payee address.
        payee: String,
        /// Expected amount in smallest units.
        expected_amount: String,
        /// Confirmation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a funding record is confirmed.
    RecordAdded {
        /// Record identifier.
        request_id: RequestId,
        /// Funding request the record belongs to.
        funding_request_id: RequestId,
        /// Shared content identifier.
        identifier: String,
        /// Confirmation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted on every payment state machine transition.
    PaymentStageChanged {
        /// Request being paid.
        request_id: RequestId,
        /// Stage entered.
        stage: PaymentStage,
        /// Transition timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted once a payment transaction has its confirmations.
    PaymentConfirmed {
        /// Request paid.
        request_id: RequestId,
        /// Paying account.
        payer: String,
        /// Amount paid in smallest units.
        amount: String,
        /// Payment transaction hash.
        tx_hash: String,
        /// Confirmation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// Emitted when a payment flow ends in `Failed`.
    PaymentFailed {
        /// Request that was being paid.
        request_id: RequestId,
        /// Human-readable failure reason.
        reason: String,
        /// Failure timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl FundingEvent {
    /// Returns the request ID associated with this event.
    #[must_use]
    pub fn request_id(&self) -> &RequestId {
        match self {
            Self::RequestCreated { request_id, .. }
            | Self::RecordAdded { request_id, .. }
            | Self::PaymentStageChanged { request_id, .. }
            | Self::PaymentConfirmed { request_id, .. }
            | Self::PaymentFailed { request_id, .. } => request_id,
        }
    }

    /// Returns `true` if the event concerns `id`, either directly or as
    /// the parent funding request of a record.
    #[must_use]
    pub fn concerns(&self, id: &RequestId) -> bool {
        match self {
            Self::RecordAdded {
                request_id,
                funding_request_id,
                ..
            } => request_id == id || funding_request_id == id,
            other => other.request_id() == id,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::RequestCreated { .. } => "request_created",
            Self::RecordAdded { .. } => "record_added",
            Self::PaymentStageChanged { .. } => "payment_stage_changed",
            Self::PaymentConfirmed { .. } => "payment_confirmed",
            Self::PaymentFailed { .. } => "payment_failed",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn request_created_event_type() {
        let event = FundingEvent::RequestCreated {
            request_id: RequestId::generate(),
            kind: ContentKind::FundingRequest,
            payee: "0xaaa".to_string(),
            expected_amount: "320000000000000000000".to_string(),
            timestamp: Utc::now(),
        };
        assert_eq!(event.event_type_str(), "request_created");
    }

    #[test]
    fn stage_change_serializes_snake_case() {
        let event = FundingEvent::PaymentStageChanged {
            request_id: RequestId::generate(),
            stage: PaymentStage::CheckingApproval,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"payment_stage_changed\""));
        assert!(json.contains("\"stage\":\"checking_approval\""));
    }

    #[test]
    fn record_concerns_its_funding_request() {
        let record_id = RequestId::generate();
        let parent = RequestId::generate();
        let event = FundingEvent::RecordAdded {
            request_id: record_id.clone(),
            funding_request_id: parent.clone(),
            identifier: "42".to_string(),
            timestamp: Utc::now(),
        };
        assert!(event.concerns(&record_id));
        assert!(event.concerns(&parent));
        assert!(!event.concerns(&RequestId::generate()));
        assert_eq!(event.request_id(), &record_id);
    }
}
