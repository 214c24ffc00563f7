//! Plain data exchanged with the storage and HTTP collaborators.
//!
//! The engine only ever borrows these values. Lifecycles (creation, status
//! changes, deletion) belong to the external store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GeoError, Result};
use crate::geo::Distance;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting out-of-range or non-finite components.
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let coord = Self { lat, lng };
        coord.validate()?;
        Ok(coord)
    }

    /// Re-check a coordinate that bypassed [`Coordinate::new`] (e.g. via serde).
    pub fn validate(&self) -> Result<()> {
        let valid = self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng);
        if valid {
            Ok(())
        } else {
            Err(GeoError::InvalidCoordinate {
                lat: self.lat,
                lng: self.lng,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListingStatus {
    #[default]
    Active,
    Matched,
    Completed,
    Cancelled,
}

impl ListingStatus {
    pub fn is_active(self) -> bool {
        self == ListingStatus::Active
    }
}

/// A driver's posted availability: a route and a departure time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub driver_id: String,
    pub from: Coordinate,
    pub to: Coordinate,
    pub departure_time: DateTime<Utc>,
    pub available_seats: u32,
    #[serde(default)]
    pub status: ListingStatus,
}

/// A driver asking for a lift along a route around a given time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub id: String,
    pub requester_id: String,
    pub from: Coordinate,
    pub to: Coordinate,
    pub requested_time: DateTime<Utc>,
    #[serde(default)]
    pub status: ListingStatus,
}

/// A scheduled delivery job. Only the destination and estimated end time
/// matter to the collision detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub user_id: String,
    pub from: Coordinate,
    pub to: Coordinate,
    pub estimated_end_time: DateTime<Utc>,
    #[serde(default)]
    pub status: ListingStatus,
}

/// One pickup/dropoff pair handed to the route planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub id: String,
    pub pickup: Coordinate,
    pub dropoff: Coordinate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CheckInKind {
    CheckIn,
    CheckOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInEvent {
    pub entity_id: String,
    pub coord: Coordinate,
    pub timestamp: DateTime<Utc>,
    pub kind: CheckInKind,
}

/// Display data for a driver, supplied by the external directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// Inclusive time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(GeoError::InvalidTimeRange(format!(
                "window ends ({}) before it starts ({})",
                self.end.to_rfc3339(),
                self.start.to_rfc3339()
            )));
        }
        Ok(())
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}

/// A candidate with its transient compatibility score (0-100).
///
/// Borrowed from the caller's collection; recomputed on every query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranked<'a, T> {
    pub candidate: &'a T,
    pub score: u8,
}

/// Timing for one leg of a planned route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegEta {
    pub leg_id: String,
    /// Cursor (start or previous dropoff) to this leg's pickup.
    pub approach_distance: Distance,
    /// Pickup to dropoff.
    pub leg_distance: Distance,
    pub minutes: f64,
    pub depart_at: DateTime<Utc>,
    pub arrive_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub ordered_legs: Vec<Leg>,
    pub leg_etas: Vec<LegEta>,
    pub total_distance: Distance,
    pub total_duration_minutes: f64,
    pub encoded_polyline: String,
}

impl RoutePlan {
    pub fn empty() -> Self {
        Self {
            ordered_legs: Vec::new(),
            leg_etas: Vec::new(),
            total_distance: Distance::ZERO,
            total_duration_minutes: 0.0,
            encoded_polyline: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_legs.is_empty()
    }
}
