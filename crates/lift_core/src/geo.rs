//! Great-circle primitives: distance, bearing, angular difference.
//!
//! Kilometres are the canonical unit. Every distance is computed with the
//! single [`EARTH_RADIUS_KM`] constant and carried as a [`Distance`]; miles
//! are only produced on demand at display boundaries.

use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::Coordinate;

/// Mean Earth radius used by every distance computation in the crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const KM_PER_MILE: f64 = 1.609_344;

/// A non-negative length, stored in kilometres.
///
/// Serializes as a bare number of kilometres.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Distance(f64);

impl Distance {
    pub const ZERO: Distance = Distance(0.0);

    pub fn from_km(km: f64) -> Self {
        Self(km)
    }

    pub fn from_miles(miles: f64) -> Self {
        Self(miles * KM_PER_MILE)
    }

    pub fn km(self) -> f64 {
        self.0
    }

    pub fn miles(self) -> f64 {
        self.0 / KM_PER_MILE
    }
}

impl Add for Distance {
    type Output = Distance;

    fn add(self, rhs: Distance) -> Distance {
        Distance(self.0 + rhs.0)
    }
}

impl Sum for Distance {
    fn sum<I: Iterator<Item = Distance>>(iter: I) -> Distance {
        iter.fold(Distance::ZERO, Add::add)
    }
}

/// Haversine distance between two coordinates.
pub fn distance(a: &Coordinate, b: &Coordinate) -> Result<Distance> {
    a.validate()?;
    b.validate()?;
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let sin_dlat = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon = ((lon2 - lon1) * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    Ok(Distance(EARTH_RADIUS_KM * c))
}

/// Initial compass bearing from `a` to `b`, in degrees within `[0, 360)`.
///
/// Identical points yield 0.
pub fn bearing(a: &Coordinate, b: &Coordinate) -> Result<f64> {
    a.validate()?;
    b.validate()?;
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlon = (b.lng - a.lng).to_radians();
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let degrees = y.atan2(x).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    Ok(if degrees >= 360.0 { 0.0 } else { degrees })
}

/// Minimal absolute difference between two bearings, in `[0, 180]`.
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).abs().rem_euclid(360.0);
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Great-circle midpoint of two coordinates.
pub fn midpoint(a: &Coordinate, b: &Coordinate) -> Result<Coordinate> {
    a.validate()?;
    b.validate()?;
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let lat2 = b.lat.to_radians();
    let dlon = (b.lng - a.lng).to_radians();
    let bx = lat2.cos() * dlon.cos();
    let by = lat2.cos() * dlon.sin();
    let lat = (lat1.sin() + lat2.sin()).atan2(((lat1.cos() + bx).powi(2) + by * by).sqrt());
    let lon = lon1 + by.atan2(lat1.cos() + bx);
    let lng = (lon.to_degrees() + 540.0).rem_euclid(360.0) - 180.0;
    Coordinate::new(lat.to_degrees(), lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoError;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).expect("valid coordinate")
    }

    #[test]
    fn distance_to_self_is_zero() {
        let p = coord(51.5074, -0.1278);
        assert_eq!(distance(&p, &p).unwrap(), Distance::ZERO);
    }

    #[test]
    fn london_to_manchester_matches_reference() {
        let london = coord(51.5074, -0.1278);
        let manchester = coord(53.4808, -2.2426);
        let d = distance(&london, &manchester).unwrap();
        assert!((d.km() - 262.0).abs() < 262.0 * 0.03, "got {} km", d.km());
        assert!((d.miles() - 163.0).abs() < 163.0 * 0.03, "got {} mi", d.miles());
    }

    #[test]
    fn cardinal_bearings() {
        let origin = coord(0.0, 0.0);
        assert!((bearing(&origin, &coord(1.0, 0.0)).unwrap() - 0.0).abs() < 1e-9);
        assert!((bearing(&origin, &coord(0.0, 1.0)).unwrap() - 90.0).abs() < 1e-9);
        assert!((bearing(&origin, &coord(-1.0, 0.0)).unwrap() - 180.0).abs() < 1e-9);
        assert!((bearing(&origin, &coord(0.0, -1.0)).unwrap() - 270.0).abs() < 1e-9);
    }

    #[test]
    fn angle_diff_wraps_around_north() {
        assert_eq!(angle_diff(10.0, 350.0), 20.0);
        assert_eq!(angle_diff(350.0, 10.0), 20.0);
        assert_eq!(angle_diff(0.0, 180.0), 180.0);
        assert_eq!(angle_diff(90.0, 90.0), 0.0);
        assert_eq!(angle_diff(-90.0, 90.0), 180.0);
    }

    #[test]
    fn midpoint_lies_between_endpoints() {
        let a = coord(52.0, -2.0);
        let b = coord(54.0, -2.0);
        let m = midpoint(&a, &b).unwrap();
        assert!((m.lat - 53.0).abs() < 1e-6);
        assert!((m.lng + 2.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_input_fails_fast() {
        let bad = Coordinate { lat: 95.0, lng: 0.0 };
        let ok = coord(0.0, 0.0);
        assert!(matches!(
            distance(&bad, &ok),
            Err(GeoError::InvalidCoordinate { .. })
        ));
        assert!(bearing(&ok, &bad).is_err());
    }

    #[test]
    fn distance_units_convert_consistently() {
        let d = Distance::from_miles(10.0);
        assert!((d.km() - 16.09344).abs() < 1e-9);
        assert!((d.miles() - 10.0).abs() < 1e-9);
        let total: Distance = [Distance::from_km(1.0), Distance::from_km(2.5)].into_iter().sum();
        assert_eq!(total, Distance::from_km(3.5));
    }
}
