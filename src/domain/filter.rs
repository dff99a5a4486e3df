//! Client-side predicates over typed requests.
//!
//! The store returns everything associated with an identity. A
//! [`RequestFilter`] narrows that down; every predicate that is set must
//! hold, unset predicates match everything.

use super::Address;
use super::content::ContentKind;
use super::request::TypedRequest;

/// Conjunction of listing predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    /// Keep only this content kind.
    pub kind: Option<ContentKind>,
    /// Keep only requests authored by this farmer.
    pub farmer: Option<Address>,
    /// Keep only requests whose investor is this address.
    pub investor: Option<Address>,
    /// Keep only fully funded (`true`) or not fully funded (`false`).
    pub fully_funded: Option<bool>,
    /// Keep only requests nobody has invested in yet.
    pub available_only: bool,
}

impl RequestFilter {
    /// Matches everything.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to one content kind.
    #[must_use]
    pub fn kind(mut self, kind: ContentKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Restricts to requests authored by `farmer`.
    #[must_use]
    pub fn farmer(mut self, farmer: Address) -> Self {
        self.farmer = Some(farmer);
        self
    }

    /// Restricts to requests funded by `investor`.
    #[must_use]
    pub fn investor(mut self, investor: Address) -> Self {
        self.investor = Some(investor);
        self
    }

    /// Restricts by funding completion.
    #[must_use]
    pub fn fully_funded(mut self, fully_funded: bool) -> Self {
        self.fully_funded = Some(fully_funded);
        self
    }

    /// Restricts to requests without an investor.
    #[must_use]
    pub fn available(mut self) -> Self {
        self.available_only = true;
        self
    }

    /// Funding requests of the marketplace.
    #[must_use]
    pub fn explore() -> Self {
        Self::all().kind(ContentKind::FundingRequest)
    }

    /// Funding requests the caller created.
    #[must_use]
    pub fn farm(caller: Address) -> Self {
        Self::all().kind(ContentKind::FundingRequest).farmer(caller)
    }

    /// Fully funded funding requests the caller invested in.
    #[must_use]
    pub fn investments(caller: Address) -> Self {
        Self::all()
            .kind(ContentKind::FundingRequest)
            .investor(caller)
            .fully_funded(true)
    }

    /// Returns `true` if `request` satisfies every set predicate.
    #[must_use]
    pub fn matches(&self, request: &TypedRequest) -> bool {
        if self.kind.is_some_and(|k| k != request.kind()) {
            return false;
        }
        if self.farmer.is_some_and(|f| f != request.content.farmer()) {
            return false;
        }
        if let Some(investor) = self.investor
            && request.investor() != Some(investor)
        {
            return false;
        }
        if self
            .fully_funded
            .is_some_and(|wanted| wanted != request.data.is_fully_funded())
        {
            return false;
        }
        !self.available_only || request.is_available()
    }

    /// Keeps the matching requests, preserving order.
    #[must_use]
    pub fn apply(&self, requests: Vec<TypedRequest>) -> Vec<TypedRequest> {
        requests.into_iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::request::fixtures::{data, funding_content, paid_by, record_content};

    const FARMER: Address = Address::from_bytes([1u8; 20]);
    const OTHER_FARMER: Address = Address::from_bytes([3u8; 20]);
    const INVESTOR: Address = Address::from_bytes([2u8; 20]);

    fn typed(d: crate::domain::request::RequestData) -> TypedRequest {
        let Ok(t) = d.into_typed() else {
            panic!("fixture payloads are valid");
        };
        t
    }

    fn mixed() -> Vec<TypedRequest> {
        vec![
            typed(data(&funding_content("a", FARMER), FARMER, 100)),
            typed(data(&record_content("a", FARMER, "planted"), FARMER, 0)),
            typed(paid_by(
                data(&funding_content("b", FARMER), FARMER, 100),
                INVESTOR,
                100,
            )),
            typed(data(&record_content("b", FARMER, "harvested"), FARMER, 0)),
            typed(data(&funding_content("c", OTHER_FARMER), OTHER_FARMER, 100)),
        ]
    }

    #[test]
    fn kind_filter_returns_exactly_matching_subset() {
        let all = mixed();
        let requests = RequestFilter::all()
            .kind(ContentKind::FundingRequest)
            .apply(all.clone());
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.kind() == ContentKind::FundingRequest));

        let records = RequestFilter::all()
            .kind(ContentKind::FundingRecord)
            .apply(all);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.kind() == ContentKind::FundingRecord));
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert_eq!(RequestFilter::all().apply(mixed()).len(), 5);
    }

    #[test]
    fn farm_view_keeps_own_funding_requests() {
        let mine = RequestFilter::farm(FARMER).apply(mixed());
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|r| r.content.farmer() == FARMER));
    }

    #[test]
    fn investments_view_requires_full_funding_and_investor_match() {
        let investments = RequestFilter::investments(INVESTOR).apply(mixed());
        assert_eq!(investments.len(), 1);
        assert_eq!(investments.first().map(|r| r.content.identifier()), Some("b"));

        assert!(RequestFilter::investments(FARMER).apply(mixed()).is_empty());
    }

    #[test]
    fn available_excludes_funded_requests() {
        let open = RequestFilter::explore().available().apply(mixed());
        let ids: Vec<&str> = open.iter().map(|r| r.content.identifier()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn fully_funded_false_keeps_open_requests() {
        let open = RequestFilter::explore().fully_funded(false).apply(mixed());
        assert_eq!(open.len(), 2);
    }
}
