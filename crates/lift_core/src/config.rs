//! Tunable policy for every engine component.
//!
//! The defaults reproduce the marketplace's historical behaviour. None of the
//! weights or radii are validated against real outcomes; they are inputs so
//! that product can retune them without touching the algorithms.
//!
//! Every struct deserializes with `#[serde(default)]`, so a partial JSON
//! document only overrides the fields it names.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};
use crate::geo::Distance;
use crate::traffic::{TrafficProfile, TrafficProfileKind};

/// Default route similarity threshold for offer/request endpoints.
const DEFAULT_ROUTE_THRESHOLD_KM: f64 = 30.0;

/// Default proximity radius: 10 miles.
const DEFAULT_NEARBY_RADIUS_KM: f64 = 10.0 * crate::geo::KM_PER_MILE;

/// Slowest average speed an ETA configuration may use.
pub const MIN_AVERAGE_SPEED_MPH: f64 = 1.0;

/// Per-stop overhead must stay below one day.
pub const MAX_PER_STOP_OVERHEAD_MINUTES: f64 = 24.0 * 60.0;

/// NaN and negative spans collapse to zero, spans past chrono's range
/// saturate at `Duration::MAX`.
fn millis(ms: f64) -> Duration {
    if ms.is_nan() || ms <= 0.0 {
        return Duration::zero();
    }
    Duration::try_milliseconds(ms.round() as i64).unwrap_or(Duration::MAX)
}

fn hours(h: f64) -> Duration {
    millis(h * 3_600_000.0)
}

fn minutes(m: f64) -> Duration {
    millis(m * 60_000.0)
}

fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(GeoError::InvalidConfig(format!(
            "{name} must be a finite non-negative number, got {value}"
        )))
    }
}

/// Offer/request compatibility scoring.
///
/// A pair scores `100 - origin_km * origin_penalty_per_km
/// - destination_km * destination_penalty_per_km - hours * time_penalty_per_hour`,
/// once both endpoint pairs are within `route_threshold_km` and the times are
/// within `time_window_hours`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchPolicy {
    pub route_threshold_km: f64,
    pub time_window_hours: f64,
    pub origin_penalty_per_km: f64,
    pub destination_penalty_per_km: f64,
    pub time_penalty_per_hour: f64,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            route_threshold_km: DEFAULT_ROUTE_THRESHOLD_KM,
            time_window_hours: 2.0,
            origin_penalty_per_km: 0.5,
            destination_penalty_per_km: 0.5,
            time_penalty_per_hour: 10.0,
        }
    }
}

impl MatchPolicy {
    pub fn route_threshold(&self) -> Distance {
        Distance::from_km(self.route_threshold_km)
    }

    pub fn time_window(&self) -> Duration {
        hours(self.time_window_hours)
    }

    pub fn with_route_threshold_km(mut self, km: f64) -> Self {
        self.route_threshold_km = km;
        self
    }

    pub fn with_time_window_hours(mut self, hours: f64) -> Self {
        self.time_window_hours = hours;
        self
    }

    pub fn with_time_penalty_per_hour(mut self, points: f64) -> Self {
        self.time_penalty_per_hour = points;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("routeThresholdKm", self.route_threshold_km)?;
        ensure_non_negative("timeWindowHours", self.time_window_hours)?;
        ensure_non_negative("originPenaltyPerKm", self.origin_penalty_per_km)?;
        ensure_non_negative("destinationPenaltyPerKm", self.destination_penalty_per_km)?;
        ensure_non_negative("timePenaltyPerHour", self.time_penalty_per_hour)
    }
}

/// "Drivers near me" lookups over check-in events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProximityConfig {
    pub max_distance_km: f64,
    pub max_age_hours: f64,
    /// H3 resolution used to bucket events (0-15). Coarser cells mean fewer
    /// disk cells per query and more exact distance checks.
    pub h3_resolution: u8,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_NEARBY_RADIUS_KM,
            max_age_hours: 24.0,
            h3_resolution: 6,
        }
    }
}

impl ProximityConfig {
    pub fn max_distance(&self) -> Distance {
        Distance::from_km(self.max_distance_km)
    }

    pub fn max_age(&self) -> Duration {
        hours(self.max_age_hours)
    }

    pub fn with_max_distance_km(mut self, km: f64) -> Self {
        self.max_distance_km = km;
        self
    }

    pub fn with_max_age_hours(mut self, hours: f64) -> Self {
        self.max_age_hours = hours;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("maxDistanceKm", self.max_distance_km)?;
        ensure_non_negative("maxAgeHours", self.max_age_hours)?;
        if self.h3_resolution > 15 {
            return Err(GeoError::InvalidConfig(format!(
                "h3Resolution must be within 0..=15, got {}",
                self.h3_resolution
            )));
        }
        Ok(())
    }
}

/// Cross-schedule destination proximity detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollisionConfig {
    pub max_distance_km: f64,
    pub max_window_minutes: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            max_distance_km: 3.0,
            max_window_minutes: 60.0,
        }
    }
}

impl CollisionConfig {
    pub fn max_distance(&self) -> Distance {
        Distance::from_km(self.max_distance_km)
    }

    pub fn max_window(&self) -> Duration {
        minutes(self.max_window_minutes)
    }

    pub fn with_max_distance_km(mut self, km: f64) -> Self {
        self.max_distance_km = km;
        self
    }

    pub fn with_max_window_minutes(mut self, minutes: f64) -> Self {
        self.max_window_minutes = minutes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("maxDistanceKm", self.max_distance_km)?;
        ensure_non_negative("maxWindowMinutes", self.max_window_minutes)
    }
}

/// Travel-time heuristic: a flat average speed, an hour-of-day multiplier and
/// a fixed per-stop overhead. A stand-in for real traffic data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EtaConfig {
    pub average_speed_mph: f64,
    pub per_stop_overhead_minutes: f64,
    /// Multiplier for the morning (07-09) and evening (16-18) peaks.
    pub peak_multiplier: f64,
    /// Multiplier for every other hour.
    pub off_peak_multiplier: f64,
    pub traffic_profile: TrafficProfileKind,
}

impl Default for EtaConfig {
    fn default() -> Self {
        Self {
            average_speed_mph: 60.0,
            per_stop_overhead_minutes: 5.0,
            peak_multiplier: 1.25,
            off_peak_multiplier: 1.10,
            traffic_profile: TrafficProfileKind::PeakBias,
        }
    }
}

impl EtaConfig {
    /// Resolve the hourly multiplier table this configuration describes.
    pub fn profile(&self) -> TrafficProfile {
        TrafficProfile::from_kind(
            &self.traffic_profile,
            self.peak_multiplier,
            self.off_peak_multiplier,
        )
    }

    pub fn with_average_speed_mph(mut self, mph: f64) -> Self {
        self.average_speed_mph = mph;
        self
    }

    pub fn with_traffic_profile(mut self, kind: TrafficProfileKind) -> Self {
        self.traffic_profile = kind;
        self
    }

    pub fn with_per_stop_overhead_minutes(mut self, minutes: f64) -> Self {
        self.per_stop_overhead_minutes = minutes;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("perStopOverheadMinutes", self.per_stop_overhead_minutes)?;
        if self.per_stop_overhead_minutes >= MAX_PER_STOP_OVERHEAD_MINUTES {
            return Err(GeoError::InvalidConfig(format!(
                "perStopOverheadMinutes must be below {MAX_PER_STOP_OVERHEAD_MINUTES}, got {}",
                self.per_stop_overhead_minutes
            )));
        }
        ensure_non_negative("peakMultiplier", self.peak_multiplier)?;
        ensure_non_negative("offPeakMultiplier", self.off_peak_multiplier)?;
        for (hour, factor) in self.profile().hourly_factors.iter().enumerate() {
            ensure_non_negative(&format!("trafficProfile[{hour}]"), *factor)?;
        }
        if !(self.average_speed_mph.is_finite() && self.average_speed_mph >= MIN_AVERAGE_SPEED_MPH)
        {
            return Err(GeoError::InvalidConfig(format!(
                "averageSpeedMph must be at least {MIN_AVERAGE_SPEED_MPH}, got {}",
                self.average_speed_mph
            )));
        }
        Ok(())
    }
}

/// Corridor density scoring for a planned route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DensityConfig {
    pub corridor_radius_miles: f64,
    pub min_bearing_match_deg: f64,
    /// Compatible candidates that count as a fully dense corridor (score 1.0).
    pub expected_baseline: f64,
    pub medium_threshold: f64,
    pub high_threshold: f64,
    pub max_meetup_points: usize,
}

impl Default for DensityConfig {
    fn default() -> Self {
        Self {
            corridor_radius_miles: 5.0,
            min_bearing_match_deg: 45.0,
            expected_baseline: 10.0,
            medium_threshold: 0.34,
            high_threshold: 0.67,
            max_meetup_points: 3,
        }
    }
}

impl DensityConfig {
    pub fn corridor_radius(&self) -> Distance {
        Distance::from_miles(self.corridor_radius_miles)
    }

    pub fn with_corridor_radius_miles(mut self, miles: f64) -> Self {
        self.corridor_radius_miles = miles;
        self
    }

    pub fn with_expected_baseline(mut self, baseline: f64) -> Self {
        self.expected_baseline = baseline;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("corridorRadiusMiles", self.corridor_radius_miles)?;
        ensure_non_negative("minBearingMatchDeg", self.min_bearing_match_deg)?;
        ensure_non_negative("mediumThreshold", self.medium_threshold)?;
        ensure_non_negative("highThreshold", self.high_threshold)?;
        if !(self.expected_baseline.is_finite() && self.expected_baseline > 0.0) {
            return Err(GeoError::InvalidConfig(format!(
                "expectedBaseline must be positive, got {}",
                self.expected_baseline
            )));
        }
        Ok(())
    }
}

/// Every component's policy in one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub matching: MatchPolicy,
    pub proximity: ProximityConfig,
    pub collision: CollisionConfig,
    pub eta: EtaConfig,
    pub density: DensityConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        self.matching.validate()?;
        self.proximity.validate()?;
        self.collision.validate()?;
        self.eta.validate()?;
        self.density.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_marketplace_policy() {
        let config = EngineConfig::default();
        assert_eq!(config.matching.route_threshold_km, 30.0);
        assert_eq!(config.matching.time_window(), Duration::hours(2));
        assert_eq!(config.collision.max_window(), Duration::minutes(60));
        assert_eq!(config.proximity.max_age(), Duration::hours(24));
        assert!((config.proximity.max_distance().miles() - 10.0).abs() < 1e-9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let json = r#"{"collision": {"maxDistanceKm": 1.5}, "eta": {"averageSpeedMph": 45}}"#;
        let config: EngineConfig = serde_json::from_str(json).expect("config");
        assert_eq!(config.collision.max_distance_km, 1.5);
        assert_eq!(config.collision.max_window_minutes, 60.0);
        assert_eq!(config.eta.average_speed_mph, 45.0);
        assert_eq!(config.eta.per_stop_overhead_minutes, 5.0);
        assert_eq!(config.matching, MatchPolicy::default());
    }

    #[test]
    fn validate_rejects_negative_values() {
        let mut config = EngineConfig::default();
        config.collision = config.collision.with_max_window_minutes(-5.0);
        assert!(config.validate().is_err());

        let config = EngineConfig {
            eta: EtaConfig::default().with_average_speed_mph(0.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn eta_bounds_reject_crawling_speed_and_day_long_stops() {
        let eta = EtaConfig::default().with_average_speed_mph(1e-12);
        assert!(matches!(eta.validate(), Err(GeoError::InvalidConfig(_))));

        let eta = EtaConfig::default().with_per_stop_overhead_minutes(1e300);
        assert!(matches!(eta.validate(), Err(GeoError::InvalidConfig(_))));

        let eta = EtaConfig::default()
            .with_average_speed_mph(MIN_AVERAGE_SPEED_MPH)
            .with_per_stop_overhead_minutes(30.0);
        assert!(eta.validate().is_ok());
    }

    #[test]
    fn custom_traffic_factors_must_be_finite_and_non_negative() {
        let mut factors = [1.0; 24];
        factors[8] = -3.0;
        let eta = EtaConfig::default().with_traffic_profile(TrafficProfileKind::Custom(factors));
        assert!(matches!(eta.validate(), Err(GeoError::InvalidConfig(_))));

        factors[8] = f64::NAN;
        let eta = EtaConfig::default().with_traffic_profile(TrafficProfileKind::Custom(factors));
        assert!(eta.validate().is_err());

        let eta = EtaConfig::default().with_traffic_profile(TrafficProfileKind::Custom([0.8; 24]));
        assert!(eta.validate().is_ok());
    }

    #[test]
    fn out_of_range_windows_clamp_instead_of_panicking() {
        let policy = MatchPolicy::default().with_time_window_hours(f64::NEG_INFINITY);
        assert_eq!(policy.time_window(), Duration::zero());
        let policy = MatchPolicy::default().with_time_window_hours(f64::NAN);
        assert_eq!(policy.time_window(), Duration::zero());
        let policy = MatchPolicy::default().with_time_window_hours(1e300);
        assert_eq!(policy.time_window(), Duration::MAX);
        assert!(policy.validate().is_ok());
    }
}
