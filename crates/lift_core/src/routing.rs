//! Route planning over pickup/dropoff legs.
//!
//! - **order_legs**: greedy nearest-neighbour ordering on pickup points
//! - **plan_route**: ordering plus per-leg distances, ETAs (evaluated at each
//!   leg's own start time) and an encoded polyline of the visit sequence
//!
//! Nearest-neighbour is O(n²) and not globally optimal.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tracing::debug;

use crate::config::EtaConfig;
use crate::error::{GeoError, Result};
use crate::geo::{distance, Distance};
use crate::model::{Coordinate, Leg, LegEta, RoutePlan};
use crate::polyline::encode_polyline;
use crate::traffic::estimate_minutes_at;

/// Order `legs` by repeatedly taking the leg whose pickup is closest to the
/// cursor, then moving the cursor to that leg's dropoff.
///
/// Ties keep input order. Duplicate legs are kept.
pub fn order_legs(start: &Coordinate, legs: &[Leg]) -> Result<Vec<Leg>> {
    start.validate()?;
    let mut remaining: Vec<&Leg> = legs.iter().collect();
    let mut ordered = Vec::with_capacity(legs.len());
    let mut cursor = *start;

    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_distance = distance(&cursor, &remaining[0].pickup)?;
        for (i, leg) in remaining.iter().enumerate().skip(1) {
            let d = distance(&cursor, &leg.pickup)?;
            if d.partial_cmp(&best_distance) == Some(Ordering::Less) {
                best = i;
                best_distance = d;
            }
        }
        let leg = remaining.remove(best);
        leg.dropoff.validate()?;
        cursor = leg.dropoff;
        ordered.push(leg.clone());
    }
    Ok(ordered)
}

/// `clock + minutes`, or `InvalidConfig` when the ETA is not a usable span.
fn advance(clock: DateTime<FixedOffset>, minutes: f64) -> Result<DateTime<FixedOffset>> {
    let ms = (minutes * 60_000.0).round();
    if !(ms.is_finite() && ms >= 0.0) {
        return Err(GeoError::InvalidConfig(format!("leg ETA of {minutes} minutes")));
    }
    Duration::try_milliseconds(ms as i64)
        .and_then(|d| clock.checked_add_signed(d))
        .ok_or_else(|| {
            GeoError::InvalidConfig(format!("leg ETA of {minutes} minutes overflows the clock"))
        })
}

/// Order the legs and time them from `departure`.
///
/// Each leg covers the approach (cursor to pickup) plus the leg itself
/// (pickup to dropoff). Its ETA uses the local hour at which that leg starts,
/// so a plan that runs into rush hour slows down part-way.
///
/// `config` is validated first. An arrival past chrono's range is
/// [`GeoError::InvalidConfig`].
pub fn plan_route(
    start: &Coordinate,
    legs: &[Leg],
    departure: DateTime<FixedOffset>,
    config: &EtaConfig,
) -> Result<RoutePlan> {
    config.validate()?;
    let ordered = order_legs(start, legs)?;
    if ordered.is_empty() {
        return Ok(RoutePlan::empty());
    }

    let mut cursor = *start;
    let mut clock = departure;
    let mut leg_etas = Vec::with_capacity(ordered.len());
    let mut path = Vec::with_capacity(ordered.len() * 2 + 1);
    path.push(*start);

    for leg in &ordered {
        let approach = distance(&cursor, &leg.pickup)?;
        let leg_distance = distance(&leg.pickup, &leg.dropoff)?;
        let minutes = estimate_minutes_at(approach + leg_distance, clock, config);
        let arrive = advance(clock, minutes)?;

        leg_etas.push(LegEta {
            leg_id: leg.id.clone(),
            approach_distance: approach,
            leg_distance,
            minutes,
            depart_at: clock.with_timezone(&Utc),
            arrive_at: arrive.with_timezone(&Utc),
        });
        path.push(leg.pickup);
        path.push(leg.dropoff);
        cursor = leg.dropoff;
        clock = arrive;
    }

    let total_distance: Distance = leg_etas
        .iter()
        .map(|eta| eta.approach_distance + eta.leg_distance)
        .sum();
    let total_duration_minutes = leg_etas.iter().map(|eta| eta.minutes).sum();

    debug!(
        legs = ordered.len(),
        km = total_distance.km(),
        minutes = total_duration_minutes,
        "planned route"
    );

    Ok(RoutePlan {
        encoded_polyline: encode_polyline(&path)?,
        ordered_legs: ordered,
        leg_etas,
        total_distance,
        total_duration_minutes,
    })
}
