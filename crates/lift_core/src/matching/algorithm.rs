use crate::error::Result;
use crate::model::{Offer, Request};

/// Trait for policies that rate how well an offer serves a request.
///
/// Ranking is written against this trait, so the default
/// [`PenaltyScorer`](super::PenaltyScorer) can be replaced by another policy
/// without touching the ranking code.
///
/// # Contract
///
/// - Return a score in `0..=100`; 0 means "not a match" and is never ranked.
/// - Be a pure function of the two inputs.
/// - Propagate coordinate validation errors instead of scoring them as 0.
pub trait CompatibilityScorer: Send + Sync {
    fn score(&self, offer: &Offer, request: &Request) -> Result<u8>;
}
