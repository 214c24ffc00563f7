mod support;

use chrono::{FixedOffset, TimeZone, Utc};
use lift_core::config::EtaConfig;
use lift_core::geo::Distance;
use lift_core::polyline::decode_polyline;
use lift_core::routing::{order_legs, plan_route};
use lift_core::traffic::{estimate_minutes, TrafficProfileKind};
use lift_core::test_helpers::{coord, leg, BIRMINGHAM, BRISTOL, LEEDS, MANCHESTER, NOTTINGHAM};
use lift_core::GeoError;
use support::assertions::assert_close;

#[test]
fn order_legs_trivial_inputs() {
    let start = coord(BIRMINGHAM.0, BIRMINGHAM.1);
    assert!(order_legs(&start, &[]).unwrap().is_empty());

    let single = leg("only", MANCHESTER, LEEDS);
    assert_eq!(
        order_legs(&start, std::slice::from_ref(&single)).unwrap(),
        vec![single]
    );
}

#[test]
fn duplicates_are_kept() {
    let start = coord(BIRMINGHAM.0, BIRMINGHAM.1);
    let legs = vec![leg("a", NOTTINGHAM, LEEDS), leg("a", NOTTINGHAM, LEEDS)];
    assert_eq!(order_legs(&start, &legs).unwrap().len(), 2);
}

#[test]
fn delivery_day_across_the_midlands() {
    let start = coord(BIRMINGHAM.0, BIRMINGHAM.1);
    let legs = vec![
        leg("leeds-bristol", LEEDS, BRISTOL),
        leg("nottingham-leeds", NOTTINGHAM, LEEDS),
        leg("bristol-birmingham", BRISTOL, BIRMINGHAM),
    ];
    let departure = FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
        .unwrap();
    let plan = plan_route(&start, &legs, departure, &EtaConfig::default()).unwrap();

    let ids: Vec<&str> = plan.ordered_legs.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["nottingham-leeds", "leeds-bristol", "bristol-birmingham"]);

    // Approach distances chain onto the previous dropoff.
    assert_eq!(plan.leg_etas[1].approach_distance, Distance::ZERO);
    assert_eq!(plan.leg_etas[2].approach_distance, Distance::ZERO);
    for pair in plan.leg_etas.windows(2) {
        assert_eq!(pair[0].arrive_at, pair[1].depart_at);
    }
    assert_eq!(
        plan.leg_etas[0].depart_at,
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    );

    let summed: f64 = plan
        .leg_etas
        .iter()
        .map(|e| e.approach_distance.km() + e.leg_distance.km())
        .sum();
    assert_close(plan.total_distance.km(), summed, 1e-9);
    assert_eq!(decode_polyline(&plan.encoded_polyline).unwrap().len(), 7);
}

#[test]
fn estimate_minutes_reads_local_hour() {
    let config = EtaConfig::default();
    let sixty_miles = Distance::from_miles(60.0);

    assert_close(
        estimate_minutes(sixty_miles, "2024-05-01T12:00:00Z", &config).unwrap(),
        71.0,
        1e-9,
    );
    // 07:30 at +01:00 is peak even though it is 06:30 UTC.
    assert_close(
        estimate_minutes(sixty_miles, "2024-05-01T07:30:00+01:00", &config).unwrap(),
        80.0,
        1e-9,
    );
    assert_close(
        estimate_minutes(sixty_miles, "2024-05-01T17:15", &config).unwrap(),
        80.0,
        1e-9,
    );
}

#[test]
fn flat_profile_removes_the_peak() {
    let config = EtaConfig::default().with_traffic_profile(TrafficProfileKind::Flat);
    let minutes = estimate_minutes(Distance::from_miles(30.0), "2024-05-01T08:00:00Z", &config)
        .unwrap();
    assert_close(minutes, 35.0, 1e-9);
}

#[test]
fn bad_timestamp_is_invalid_time_range() {
    let result = estimate_minutes(Distance::from_km(10.0), "1st May, 8am", &EtaConfig::default());
    assert!(matches!(result, Err(GeoError::InvalidTimeRange(_))));
}
