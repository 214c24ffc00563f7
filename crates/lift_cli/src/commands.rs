//! One function per subcommand. Each returns a JSON value ready to print.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lift_core::collision::detect_schedule_collisions;
use lift_core::config::EngineConfig;
use lift_core::density::density_for_route;
use lift_core::matching::{rank_offers_for_request, rank_requests_for_offer};
use lift_core::model::{Coordinate, TimeWindow};
use lift_core::proximity::find_nearby;
use lift_core::routing::plan_route;
use lift_core::traffic::parse_departure;
use serde_json::Value;

use crate::snapshot::{load_legs, Snapshot};

fn parse_instant(when: &str) -> Result<DateTime<Utc>> {
    Ok(parse_departure(when)
        .with_context(|| format!("invalid timestamp '{when}'"))?
        .with_timezone(&Utc))
}

pub fn rank_requests(snapshot: &Snapshot, config: &EngineConfig, offer_id: &str) -> Result<Value> {
    let offer = snapshot.offer(offer_id)?;
    let ranked = rank_requests_for_offer(offer, &snapshot.requests, &config.matching)?;
    Ok(serde_json::to_value(ranked)?)
}

pub fn rank_offers(snapshot: &Snapshot, config: &EngineConfig, request_id: &str) -> Result<Value> {
    let request = snapshot.request(request_id)?;
    let ranked = rank_offers_for_request(request, &snapshot.offers, &config.matching)?;
    Ok(serde_json::to_value(ranked)?)
}

pub fn nearby(
    snapshot: &Snapshot,
    config: &EngineConfig,
    lat: f64,
    lng: f64,
    now: Option<&str>,
) -> Result<Value> {
    let point = Coordinate::new(lat, lng)?;
    let now = match now {
        Some(when) => parse_instant(when)?,
        None => Utc::now(),
    };
    let directory = snapshot.directory();
    let drivers = find_nearby(&point, &snapshot.check_ins, now, &config.proximity, &directory)?;
    Ok(serde_json::to_value(drivers)?)
}

pub fn collisions(snapshot: &Snapshot, config: &EngineConfig, job_id: &str) -> Result<Value> {
    let job = snapshot.job(job_id)?;
    let pairs = detect_schedule_collisions(job, &snapshot.jobs, &config.collision)?;
    Ok(serde_json::to_value(pairs)?)
}

pub fn plan(config: &EngineConfig, lat: f64, lng: f64, legs: &Path, depart: &str) -> Result<Value> {
    let start = Coordinate::new(lat, lng)?;
    let legs = load_legs(legs)?;
    let departure =
        parse_departure(depart).with_context(|| format!("invalid departure '{depart}'"))?;
    let plan = plan_route(&start, &legs, departure, &config.eta)?;
    Ok(serde_json::to_value(plan)?)
}

pub fn density(
    snapshot: &Snapshot,
    config: &EngineConfig,
    polyline: &str,
    from: &str,
    to: &str,
) -> Result<Value> {
    let window = TimeWindow::new(parse_instant(from)?, parse_instant(to)?)?;
    let density = density_for_route(
        polyline,
        &snapshot.offers,
        &snapshot.requests,
        &window,
        &config.density,
    )?;
    Ok(serde_json::to_value(density)?)
}
