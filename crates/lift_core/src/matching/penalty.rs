use chrono::{DateTime, Duration, Utc};

use crate::config::MatchPolicy;
use crate::error::Result;
use crate::geo::{distance, Distance};
use crate::model::{Coordinate, Offer, Request};

use super::algorithm::CompatibilityScorer;
use super::types::ScoreBreakdown;

/// Both endpoint pairs must each be within `threshold`. A shared origin with
/// a diverging destination is not similar.
pub fn routes_similar(
    offer_from: &Coordinate,
    offer_to: &Coordinate,
    req_from: &Coordinate,
    req_to: &Coordinate,
    threshold: Distance,
) -> Result<bool> {
    let origin = distance(offer_from, req_from)?;
    let destination = distance(offer_to, req_to)?;
    Ok(origin <= threshold && destination <= threshold)
}

fn abs_diff(t1: DateTime<Utc>, t2: DateTime<Utc>) -> Duration {
    if t1 >= t2 {
        t1 - t2
    } else {
        t2 - t1
    }
}

/// True when the two timestamps are at most `window` apart.
pub fn time_windows_overlap(t1: DateTime<Utc>, t2: DateTime<Utc>, window: Duration) -> bool {
    abs_diff(t1, t2) <= window
}

/// Linear-penalty scoring: start at 100 and deduct per km of origin and
/// destination separation and per hour of time separation.
///
/// Routes are checked first; a dissimilar route scores 0 no matter how close
/// the times are.
#[derive(Debug, Clone, Copy, Default)]
pub struct PenaltyScorer {
    pub policy: MatchPolicy,
}

impl PenaltyScorer {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    /// Score with its inputs, or `None` when the route or time gate rejects the pair.
    pub fn breakdown(&self, offer: &Offer, request: &Request) -> Result<Option<ScoreBreakdown>> {
        let threshold = self.policy.route_threshold();
        let origin = distance(&offer.from, &request.from)?;
        let destination = distance(&offer.to, &request.to)?;
        if origin > threshold || destination > threshold {
            return Ok(None);
        }
        if !time_windows_overlap(
            offer.departure_time,
            request.requested_time,
            self.policy.time_window(),
        ) {
            return Ok(None);
        }

        let hours = abs_diff(offer.departure_time, request.requested_time).num_milliseconds()
            as f64
            / 3_600_000.0;
        let raw = 100.0
            - origin.km() * self.policy.origin_penalty_per_km
            - destination.km() * self.policy.destination_penalty_per_km
            - hours * self.policy.time_penalty_per_hour;

        Ok(Some(ScoreBreakdown {
            origin_separation: origin,
            destination_separation: destination,
            time_separation_hours: hours,
            score: raw.clamp(0.0, 100.0).round() as u8,
        }))
    }
}

impl CompatibilityScorer for PenaltyScorer {
    fn score(&self, offer: &Offer, request: &Request) -> Result<u8> {
        Ok(self.breakdown(offer, request)?.map_or(0, |b| b.score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{at, coord, offer, request};

    #[test]
    fn asymmetric_route_is_not_similar() {
        let a = coord(52.4862, -1.8904);
        let manchester = coord(53.4808, -2.2426);
        let london = coord(51.5074, -0.1278);
        let threshold = Distance::from_km(30.0);

        assert!(routes_similar(&a, &manchester, &a, &manchester, threshold).unwrap());
        assert!(!routes_similar(&a, &manchester, &a, &london, threshold).unwrap());
    }

    #[test]
    fn window_is_inclusive() {
        let window = Duration::hours(2);
        assert!(time_windows_overlap(at(14, 0), at(16, 0), window));
        assert!(time_windows_overlap(at(16, 0), at(14, 0), window));
        assert!(!time_windows_overlap(at(14, 0), at(16, 1), window));
    }

    #[test]
    fn identical_pair_scores_full_marks() {
        let scorer = PenaltyScorer::default();
        let o = offer("o1", (52.4862, -1.8904), (53.4808, -2.2426), at(14, 0));
        let r = request("r1", (52.4862, -1.8904), (53.4808, -2.2426), at(14, 0));
        assert_eq!(scorer.score(&o, &r).unwrap(), 100);
    }

    #[test]
    fn one_hour_apart_costs_ten_points() {
        let scorer = PenaltyScorer::default();
        let o = offer("o1", (52.4862, -1.8904), (53.4808, -2.2426), at(14, 0));
        let r = request("r1", (52.4862, -1.8904), (53.4808, -2.2426), at(15, 0));
        let b = scorer.breakdown(&o, &r).unwrap().expect("passes gates");
        assert_eq!(b.time_separation_hours, 1.0);
        assert_eq!(b.score, 90);
    }

    #[test]
    fn large_penalties_clamp_to_zero() {
        let policy = MatchPolicy::default().with_time_penalty_per_hour(80.0);
        let scorer = PenaltyScorer::new(policy);
        let o = offer("o1", (52.4862, -1.8904), (53.4808, -2.2426), at(14, 0));
        let r = request("r1", (52.4862, -1.8904), (53.4808, -2.2426), at(15, 30));
        assert_eq!(scorer.score(&o, &r).unwrap(), 0);
    }
}
