//! Offer/request compatibility: route and time gates, a 0-100 score, and
//! batch ranking in both directions.
//!
//! The free functions use [`PenaltyScorer`] with the supplied [`MatchPolicy`].
//! Use [`rank_requests_with`] / [`rank_offers_with`] to rank with another
//! [`CompatibilityScorer`].

pub mod algorithm;
pub mod penalty;
pub mod rank;
pub mod types;

pub use algorithm::CompatibilityScorer;
pub use penalty::{routes_similar, time_windows_overlap, PenaltyScorer};
pub use rank::{rank_offers_with, rank_requests_with};
pub use types::ScoreBreakdown;

use crate::config::MatchPolicy;
use crate::error::Result;
use crate::model::{Offer, Ranked, Request};

/// Compatibility of `offer` for `request` in `0..=100`; 0 means no match.
pub fn score(offer: &Offer, request: &Request, policy: &MatchPolicy) -> Result<u8> {
    PenaltyScorer::new(*policy).score(offer, request)
}

/// Active requests `offer` could serve, best first, zero scores dropped.
pub fn rank_requests_for_offer<'a>(
    offer: &Offer,
    requests: &'a [Request],
    policy: &MatchPolicy,
) -> Result<Vec<Ranked<'a, Request>>> {
    rank_requests_with(&PenaltyScorer::new(*policy), offer, requests)
}

/// Active offers with free seats that could serve `request`, best first.
pub fn rank_offers_for_request<'a>(
    request: &Request,
    offers: &'a [Offer],
    policy: &MatchPolicy,
) -> Result<Vec<Ranked<'a, Offer>>> {
    rank_offers_with(&PenaltyScorer::new(*policy), request, offers)
}
