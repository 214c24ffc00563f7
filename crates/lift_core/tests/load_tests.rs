//! Load tests for lift_core: full-population queries under realistic sizes.

mod support;

use std::time::Instant;

use chrono::{FixedOffset, TimeZone};
use h3o::Resolution;
use lift_core::config::EngineConfig;
use lift_core::density::density_for_route;
use lift_core::matching::{rank_offers_for_request, rank_requests_for_offer};
use lift_core::model::TimeWindow;
use lift_core::polyline::encode_polyline;
use lift_core::proximity::ProximityIndex;
use lift_core::routing::plan_route;
use lift_core::test_helpers::{at, coord, leg, CITIES};
use support::snapshot::SnapshotBuilder;

#[test]
#[ignore] // Only run explicitly: cargo test --package lift_core --test load_tests -- --ignored
fn test_ranking_at_marketplace_scale() {
    let snapshot = SnapshotBuilder::synthetic(42, 5_000).build();
    let policy = EngineConfig::default().matching;

    let start = Instant::now();
    let mut kept = 0;
    for offer in snapshot.offers.iter().take(200) {
        kept += rank_requests_for_offer(offer, &snapshot.requests, &policy)
            .unwrap()
            .len();
    }
    for request in snapshot.requests.iter().take(200) {
        kept += rank_offers_for_request(request, &snapshot.offers, &policy)
            .unwrap()
            .len();
    }
    let duration = start.elapsed();

    let queries_per_sec = 400.0 / duration.as_secs_f64();
    println!(
        "Ranking load test: 400 queries over 5000 candidates in {:.2}s ({:.0} queries/sec, {} kept)",
        duration.as_secs_f64(),
        queries_per_sec,
        kept
    );
    assert!(
        queries_per_sec > 50.0,
        "Should rank >50 queries/sec, got {:.0}",
        queries_per_sec
    );
}

#[test]
#[ignore]
fn test_repeated_proximity_queries() {
    let snapshot = SnapshotBuilder::synthetic(7, 20_000).build();
    let config = EngineConfig::default().proximity;
    let index = ProximityIndex::build(&snapshot.check_ins, Resolution::Six).unwrap();

    let start = Instant::now();
    let mut found = 0;
    for round in 0..1_000 {
        let (lat, lng) = CITIES[round % CITIES.len()];
        found += index
            .find_nearby(&coord(lat, lng), at(23, 0), &config, &snapshot.drivers)
            .unwrap()
            .len();
    }
    let duration = start.elapsed();

    println!(
        "Proximity load test: 1000 queries over 20000 check-ins in {:.2}s ({} hits)",
        duration.as_secs_f64(),
        found
    );
    assert!(found > 0);
    assert!(
        duration.as_secs_f64() < 10.0,
        "1000 indexed queries took {:.2}s",
        duration.as_secs_f64()
    );
}

#[test]
#[ignore]
fn test_planning_and_density_for_a_busy_driver() {
    let snapshot = SnapshotBuilder::synthetic(99, 5_000).build();
    let config = EngineConfig::default();
    let legs: Vec<_> = (0..60)
        .map(|i| {
            let from = CITIES[i % CITIES.len()];
            let to = CITIES[(i + 2) % CITIES.len()];
            leg(&format!("l{i}"), from, to)
        })
        .collect();
    let departure = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 1, 6, 0, 0)
        .unwrap();

    let start = Instant::now();
    let plan = plan_route(&coord(CITIES[0].0, CITIES[0].1), &legs, departure, &config.eta).unwrap();
    let window = TimeWindow::new(at(6, 0), at(22, 0)).unwrap();
    let route: Vec<_> = plan
        .ordered_legs
        .iter()
        .flat_map(|l| [l.pickup, l.dropoff])
        .collect();
    let density = density_for_route(
        &encode_polyline(&route).unwrap(),
        &snapshot.offers,
        &snapshot.requests,
        &window,
        &config.density,
    )
    .unwrap();
    let duration = start.elapsed();

    println!(
        "Planning load test: {} legs, {:.0} km, density {:.2} in {:.2}s",
        plan.ordered_legs.len(),
        plan.total_distance.km(),
        density.score,
        duration.as_secs_f64()
    );
    assert_eq!(plan.ordered_legs.len(), 60);
    assert!(duration.as_secs_f64() < 5.0);
}
