//! Travel-time heuristic: hour-of-day multipliers over a flat average speed.
//!
//! This is a proxy for real traffic data, not a model of it. The profile
//! scales free-flow driving time by a per-hour factor, and every stop adds a
//! fixed overhead. Swapping in a routing/traffic API later only has to
//! replace [`estimate_minutes_at`].

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::config::EtaConfig;
use crate::error::{GeoError, Result};
use crate::geo::Distance;

// ---------------------------------------------------------------------------
// Traffic profile (hour-of-day multipliers)
// ---------------------------------------------------------------------------

/// Hours (local, inclusive) treated as peak by [`TrafficProfile::peak_bias`].
pub const PEAK_HOURS: [std::ops::RangeInclusive<usize>; 2] = [7..=9, 16..=18];

/// Pre-defined traffic profiles.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum TrafficProfileKind {
    /// Peak multiplier during 07-09 and 16-18, off-peak multiplier otherwise.
    #[default]
    PeakBias,
    /// No time-of-day effect; all hourly factors are 1.0.
    Flat,
    /// Custom per-hour factors (index 0 = midnight, index 23 = 11 PM).
    Custom([f64; 24]),
}

/// Hourly travel-time multipliers. Factor 1.0 = free flow; 1.25 = 25% slower.
#[derive(Clone, Debug, PartialEq)]
pub struct TrafficProfile {
    pub hourly_factors: [f64; 24],
}

impl TrafficProfile {
    pub fn flat() -> Self {
        Self {
            hourly_factors: [1.0; 24],
        }
    }

    /// Two daily peaks at `peak`, every other hour at `off_peak`.
    pub fn peak_bias(peak: f64, off_peak: f64) -> Self {
        let mut f = [off_peak; 24];
        for range in PEAK_HOURS {
            for slot in &mut f[range] {
                *slot = peak;
            }
        }
        Self { hourly_factors: f }
    }

    /// Build from a [`TrafficProfileKind`] descriptor. The multipliers only
    /// apply to [`TrafficProfileKind::PeakBias`].
    pub fn from_kind(kind: &TrafficProfileKind, peak: f64, off_peak: f64) -> Self {
        match kind {
            TrafficProfileKind::PeakBias => Self::peak_bias(peak, off_peak),
            TrafficProfileKind::Flat => Self::flat(),
            TrafficProfileKind::Custom(factors) => Self {
                hourly_factors: *factors,
            },
        }
    }

    /// Multiplier for a local hour of day. Hours past 23 wrap.
    pub fn factor_at_hour(&self, hour: u32) -> f64 {
        self.hourly_factors[(hour % 24) as usize]
    }
}

// ---------------------------------------------------------------------------
// ETA estimation
// ---------------------------------------------------------------------------

/// Parse an ISO-8601 timestamp into wall-clock time at its own offset.
///
/// RFC 3339 strings keep their offset, so `2024-05-01T08:30:00+01:00` is
/// 08:30 local. Strings without an offset are read as local time as written.
pub fn parse_local_time(when: &str) -> Result<NaiveDateTime> {
    let when = when.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(when) {
        return Ok(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(when, fmt).ok())
        .ok_or_else(|| GeoError::InvalidTimeRange(format!("unparsable timestamp '{when}'")))
}

/// Like [`parse_local_time`] but keeps an offset: RFC 3339 strings keep
/// theirs, naive strings are taken as UTC.
pub fn parse_departure(when: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(when.trim()) {
        return Ok(dt);
    }
    let naive = parse_local_time(when)?;
    Ok(naive.and_utc().fixed_offset())
}

/// Estimated driving minutes for `distance` starting at a local hour.
///
/// `miles / mph * 60`, scaled by the profile factor for `local_hour`, plus the
/// per-stop overhead.
pub fn estimate_minutes_at_hour(distance: Distance, local_hour: u32, config: &EtaConfig) -> f64 {
    let base = distance.miles() / config.average_speed_mph * 60.0;
    base * config.profile().factor_at_hour(local_hour) + config.per_stop_overhead_minutes
}

/// Estimated driving minutes for `distance` departing at `when`.
pub fn estimate_minutes_at(
    distance: Distance,
    when: DateTime<FixedOffset>,
    config: &EtaConfig,
) -> f64 {
    estimate_minutes_at_hour(distance, when.hour(), config)
}

/// Estimated driving minutes for `distance` departing at the ISO timestamp
/// `when_iso`. Fails with [`GeoError::InvalidTimeRange`] if it cannot be parsed.
pub fn estimate_minutes(distance: Distance, when_iso: &str, config: &EtaConfig) -> Result<f64> {
    let local = parse_local_time(when_iso)?;
    Ok(estimate_minutes_at_hour(distance, local.hour(), config))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
