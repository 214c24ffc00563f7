//! Test helpers for common test setup and utilities.
//!
//! Builders take `(lat, lng)` tuples and panic on bad input, which keeps test
//! bodies short. Enabled by the default `test-helpers` feature so integration
//! tests and benches can share them.

use std::collections::HashMap;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{
    CheckInEvent, CheckInKind, Coordinate, DriverProfile, Job, Leg, ListingStatus, Offer, Request,
};

pub const BIRMINGHAM: (f64, f64) = (52.4862, -1.8904);
pub const MANCHESTER: (f64, f64) = (53.4808, -2.2426);
pub const LONDON: (f64, f64) = (51.5074, -0.1278);
pub const LEEDS: (f64, f64) = (53.8008, -1.5491);
pub const BRISTOL: (f64, f64) = (51.4545, -2.5879);
pub const NOTTINGHAM: (f64, f64) = (52.9548, -1.1581);

/// Cities the synthetic population is drawn around.
pub const CITIES: [(f64, f64); 6] = [BIRMINGHAM, MANCHESTER, LONDON, LEEDS, BRISTOL, NOTTINGHAM];

/// `hour:minute` UTC on the fixed test day, 2024-05-01.
///
/// # Panics
///
/// Panics if `hour` or `minute` is out of range.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, hour, minute, 0)
        .single()
        .expect("valid test time")
}

/// # Panics
///
/// Panics on an out-of-range coordinate.
pub fn coord(lat: f64, lng: f64) -> Coordinate {
    Coordinate::new(lat, lng).expect("valid test coordinate")
}

fn point((lat, lng): (f64, f64)) -> Coordinate {
    coord(lat, lng)
}

/// Active offer with one free seat, driven by `driver-<id>`.
pub fn offer(id: &str, from: (f64, f64), to: (f64, f64), departure: DateTime<Utc>) -> Offer {
    Offer {
        id: id.to_string(),
        driver_id: format!("driver-{id}"),
        from: point(from),
        to: point(to),
        departure_time: departure,
        available_seats: 1,
        status: ListingStatus::Active,
    }
}

/// Active request by `requester-<id>`.
pub fn request(id: &str, from: (f64, f64), to: (f64, f64), requested: DateTime<Utc>) -> Request {
    Request {
        id: id.to_string(),
        requester_id: format!("requester-{id}"),
        from: point(from),
        to: point(to),
        requested_time: requested,
        status: ListingStatus::Active,
    }
}

/// Active job for `user` ending at `to`. The start point is irrelevant to
/// collision checks and is set half a degree south.
pub fn job(id: &str, user: &str, to: (f64, f64), end: DateTime<Utc>) -> Job {
    Job {
        id: id.to_string(),
        user_id: user.to_string(),
        from: point((to.0 - 0.5, to.1)),
        to: point(to),
        estimated_end_time: end,
        status: ListingStatus::Active,
    }
}

pub fn leg(id: &str, pickup: (f64, f64), dropoff: (f64, f64)) -> Leg {
    Leg {
        id: id.to_string(),
        pickup: point(pickup),
        dropoff: point(dropoff),
        notes: None,
    }
}

pub fn check_in(entity: &str, position: (f64, f64), timestamp: DateTime<Utc>) -> CheckInEvent {
    CheckInEvent {
        entity_id: entity.to_string(),
        coord: point(position),
        timestamp,
        kind: CheckInKind::CheckIn,
    }
}

pub fn check_out(entity: &str, position: (f64, f64), timestamp: DateTime<Utc>) -> CheckInEvent {
    CheckInEvent {
        kind: CheckInKind::CheckOut,
        ..check_in(entity, position, timestamp)
    }
}

pub fn driver(id: &str) -> DriverProfile {
    DriverProfile {
        id: id.to_string(),
        display_name: format!("Driver {id}"),
        rating: None,
        avatar_url: None,
    }
}

/// Directory that knows exactly the given driver ids.
pub fn directory(ids: &[&str]) -> HashMap<String, DriverProfile> {
    ids.iter().map(|id| (id.to_string(), driver(id))).collect()
}

/// A seeded snapshot of live collections for load tests and benches.
#[derive(Debug, Clone)]
pub struct SyntheticPopulation {
    pub offers: Vec<Offer>,
    pub requests: Vec<Request>,
    pub jobs: Vec<Job>,
    pub check_ins: Vec<CheckInEvent>,
    pub drivers: HashMap<String, DriverProfile>,
}

fn jitter(rng: &mut StdRng, (lat, lng): (f64, f64), spread_deg: f64) -> (f64, f64) {
    (
        lat + rng.gen_range(-spread_deg..=spread_deg),
        lng + rng.gen_range(-spread_deg..=spread_deg),
    )
}

fn city_pair(rng: &mut StdRng) -> ((f64, f64), (f64, f64)) {
    let from = rng.gen_range(0..CITIES.len());
    let mut to = rng.gen_range(0..CITIES.len() - 1);
    if to >= from {
        to += 1;
    }
    (CITIES[from], CITIES[to])
}

/// `size` offers, requests, jobs and check-ins scattered around [`CITIES`]
/// across the test day. The same seed always yields the same population.
pub fn synthetic_population(seed: u64, size: usize) -> SyntheticPopulation {
    let mut rng = StdRng::seed_from_u64(seed);
    let day_start = at(0, 0);
    let minute = |rng: &mut StdRng| day_start + Duration::minutes(rng.gen_range(0..24 * 60));

    let mut population = SyntheticPopulation {
        offers: Vec::with_capacity(size),
        requests: Vec::with_capacity(size),
        jobs: Vec::with_capacity(size),
        check_ins: Vec::with_capacity(size),
        drivers: HashMap::with_capacity(size),
    };

    for i in 0..size {
        let (from, to) = city_pair(&mut rng);
        let mut o = offer(
            &format!("o{i}"),
            jitter(&mut rng, from, 0.1),
            jitter(&mut rng, to, 0.1),
            minute(&mut rng),
        );
        o.available_seats = rng.gen_range(0..=3);
        population.offers.push(o);

        let (from, to) = city_pair(&mut rng);
        population.requests.push(request(
            &format!("r{i}"),
            jitter(&mut rng, from, 0.1),
            jitter(&mut rng, to, 0.1),
            minute(&mut rng),
        ));

        let (_, to) = city_pair(&mut rng);
        population.jobs.push(job(
            &format!("j{i}"),
            &format!("u{}", i % (size / 2).max(1)),
            jitter(&mut rng, to, 0.05),
            minute(&mut rng),
        ));

        let (city, _) = city_pair(&mut rng);
        let id = format!("d{i}");
        population
            .check_ins
            .push(check_in(&id, jitter(&mut rng, city, 0.2), minute(&mut rng)));
        population.drivers.insert(id.clone(), driver(&id));
    }
    population
}
