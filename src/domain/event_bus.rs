//! Fan-out of funding lifecycle events.
//!
//! Services publish a [`FundingEvent`] after every confirmed submission and
//! every payment stage change. Each WebSocket connection holds its own
//! receiver and filters by request id on its side.

use tokio::sync::broadcast;

use super::FundingEvent;

/// Broadcast bus for [`FundingEvent`]s.
///
/// Backed by a bounded `tokio::broadcast` ring. A receiver that falls more
/// than `capacity` events behind loses the oldest ones and sees
/// `RecvError::Lagged` on its next read.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FundingEvent>,
}

impl EventBus {
    /// Ring size used when `EVENT_BUS_CAPACITY` is not set.
    pub const DEFAULT_CAPACITY: usize = 10_000;

    /// Creates a bus holding at most `capacity` undelivered events per
    /// receiver. A zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event and returns how many receivers it reached.
    ///
    /// With nobody listening the event is dropped and `0` is returned;
    /// lifecycle steps never fail because of the bus.
    pub fn publish(&self, event: FundingEvent) -> usize {
        let event_type = event.event_type_str();
        let request_id = event.request_id().clone();
        let delivered = self.sender.send(event).unwrap_or(0);
        tracing::trace!(event_type, %request_id, delivered, "funding event published");
        delivered
    }

    /// Creates a receiver for all events published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FundingEvent> {
        self.sender.subscribe()
    }

    /// Number of live receivers, reported by `/health`.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Utc;
    use tokio::sync::broadcast::error::RecvError;

    use super::*;
    use crate::domain::{PaymentStage, RequestId};

    fn stage(request_id: &RequestId, stage: PaymentStage) -> FundingEvent {
        FundingEvent::PaymentStageChanged {
            request_id: request_id.clone(),
            stage,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn nobody_listening_drops_the_event() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(stage(&RequestId::generate(), PaymentStage::Paying)), 0);
    }

    #[tokio::test]
    async fn stage_changes_arrive_in_publish_order() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let id = RequestId::generate();

        for s in [
            PaymentStage::CheckingFunds,
            PaymentStage::CheckingApproval,
            PaymentStage::Paying,
            PaymentStage::Confirmed,
        ] {
            bus.publish(stage(&id, s));
        }

        let mut seen = Vec::new();
        for _ in 0..4 {
            let Ok(FundingEvent::PaymentStageChanged { stage, .. }) = rx.recv().await else {
                panic!("expected a stage change");
            };
            seen.push(stage);
        }
        assert_eq!(
            seen,
            vec![
                PaymentStage::CheckingFunds,
                PaymentStage::CheckingApproval,
                PaymentStage::Paying,
                PaymentStage::Confirmed,
            ]
        );
    }

    #[tokio::test]
    async fn every_connection_gets_its_own_copy() {
        let bus = EventBus::new(8);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        let id = RequestId::generate();

        assert_eq!(bus.publish(stage(&id, PaymentStage::Failed)), 2);

        let (Ok(a), Ok(b)) = (first.recv().await, second.recv().await) else {
            panic!("both receivers should get the event");
        };
        assert_eq!(a.request_id(), &id);
        assert_eq!(b.request_id(), &id);
    }

    #[tokio::test]
    async fn slow_receiver_reports_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        let id = RequestId::generate();
        for _ in 0..3 {
            bus.publish(stage(&id, PaymentStage::Paying));
        }
        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(1))));
    }

    #[test]
    fn receiver_count_follows_connections() {
        let bus = EventBus::new(0);
        let rx = bus.subscribe();
        let _other = bus.subscribe();
        assert_eq!(bus.receiver_count(), 2);
        drop(rx);
        assert_eq!(bus.receiver_count(), 1);
    }
}
