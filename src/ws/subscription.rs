//! Per-connection subscription manager.
//!
//! Tracks which request IDs a WebSocket client follows and filters
//! events server-side.

use std::collections::HashSet;

use crate::domain::{FundingEvent, RequestId};

/// Manages the set of request subscriptions for a single WebSocket connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    /// Followed request IDs. Ignored while `subscribe_all` is set.
    request_ids: HashSet<RequestId>,
    /// Wildcard `"*"` subscription.
    subscribe_all: bool,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds request IDs to the subscription set.
    pub fn subscribe(&mut self, ids: &[RequestId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = true;
        }
        self.request_ids.extend(ids.iter().cloned());
    }

    /// Removes request IDs. `wildcard` also clears the `"*"` subscription.
    pub fn unsubscribe(&mut self, ids: &[RequestId], wildcard: bool) {
        if wildcard {
            self.subscribe_all = false;
        }
        for id in ids {
            self.request_ids.remove(id);
        }
    }

    /// Returns `true` if the event concerns a followed request.
    ///
    /// Record events also match subscribers of their parent funding request.
    #[must_use]
    pub fn matches(&self, event: &FundingEvent) -> bool {
        self.subscribe_all || self.request_ids.iter().any(|id| event.concerns(id))
    }

    /// Returns the number of explicitly subscribed request IDs.
    #[must_use]
    pub fn count(&self) -> usize {
        self.request_ids.len()
    }

    /// Returns `true` if the wildcard subscription is active.
    #[must_use]
    pub fn is_subscribed_all(&self) -> bool {
        self.subscribe_all
    }
}
