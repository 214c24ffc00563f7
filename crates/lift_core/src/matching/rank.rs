use tracing::debug;

use crate::error::Result;
use crate::model::{Offer, Ranked, Request};

use super::algorithm::CompatibilityScorer;

/// Score every eligible candidate, drop zero scores, sort by score descending.
///
/// The sort is stable, so equal scores keep the caller's order. With the
/// `parallel` feature the scoring runs on rayon; the output is identical.
fn rank_candidates<'a, T, E, S>(candidates: &'a [T], eligible: E, score: S) -> Result<Vec<Ranked<'a, T>>>
where
    T: Sync,
    E: Fn(&T) -> bool + Sync,
    S: Fn(&T) -> Result<u8> + Sync,
{
    #[cfg(feature = "parallel")]
    let scored: Vec<Ranked<'a, T>> = {
        use rayon::prelude::*;
        candidates
            .par_iter()
            .filter(|c| eligible(*c))
            .map(|c| score(c).map(|s| Ranked { candidate: c, score: s }))
            .collect::<Result<Vec<_>>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let scored: Vec<Ranked<'a, T>> = candidates
        .iter()
        .filter(|c| eligible(*c))
        .map(|c| score(c).map(|s| Ranked { candidate: c, score: s }))
        .collect::<Result<Vec<_>>>()?;

    let mut ranked: Vec<Ranked<'a, T>> = scored.into_iter().filter(|r| r.score > 0).collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(ranked)
}

/// Rank the active requests an offer could serve.
pub fn rank_requests_with<'a, S>(
    scorer: &S,
    offer: &Offer,
    requests: &'a [Request],
) -> Result<Vec<Ranked<'a, Request>>>
where
    S: CompatibilityScorer + ?Sized,
{
    let ranked = rank_candidates(
        requests,
        |r| r.status.is_active(),
        |r| scorer.score(offer, r),
    )?;
    debug!(
        offer_id = %offer.id,
        candidates = requests.len(),
        kept = ranked.len(),
        "ranked requests for offer"
    );
    Ok(ranked)
}

/// Rank the active offers with at least one free seat for a request.
pub fn rank_offers_with<'a, S>(
    scorer: &S,
    request: &Request,
    offers: &'a [Offer],
) -> Result<Vec<Ranked<'a, Offer>>>
where
    S: CompatibilityScorer + ?Sized,
{
    let ranked = rank_candidates(
        offers,
        |o| o.status.is_active() && o.available_seats > 0,
        |o| scorer.score(o, request),
    )?;
    debug!(
        request_id = %request.id,
        candidates = offers.len(),
        kept = ranked.len(),
        "ranked offers for request"
    );
    Ok(ranked)
}
