//! Proximity queries: which checked-in drivers are near a point right now.
//!
//! This module provides:
//!
//! - **ProximityIndex**: H3 cell → event-index buckets over a borrowed
//!   check-in snapshot, for repeated queries against the same snapshot
//! - **find_nearby**: one-shot query that builds the index and resolves
//!   drivers through the [`DriverDirectory`]
//!
//! The H3 disk is only a prefilter. Every candidate is confirmed with the
//! exact haversine distance, so the cell size affects speed, not results.

use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use h3o::{CellIndex, LatLng, Resolution};
use serde::Serialize;
use tracing::{debug, warn};

use crate::collaborators::DriverDirectory;
use crate::config::ProximityConfig;
use crate::error::{GeoError, Result};
use crate::geo::{distance, Distance};
use crate::model::{CheckInEvent, CheckInKind, Coordinate, DriverProfile};

/// Disks larger than this many rings fall back to scanning every bucket.
const MAX_DISK_RINGS: u32 = 64;

/// A resolved driver near the query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDriver<'a> {
    pub driver: DriverProfile,
    pub event: &'a CheckInEvent,
    pub distance: Distance,
}

fn cell_for(coord: &Coordinate, resolution: Resolution) -> Result<CellIndex> {
    LatLng::new(coord.lat, coord.lng)
        .map(|ll| ll.to_cell(resolution))
        .map_err(|_| GeoError::InvalidCoordinate {
            lat: coord.lat,
            lng: coord.lng,
        })
}

/// Rings needed so the disk covers `radius` from anywhere in the origin cell.
///
/// Assumes one ring per edge length, which undershoots the real centre
/// spacing (about 1.7 edges) and absorbs cell-size variation across the globe.
fn disk_rings(radius: Distance, resolution: Resolution) -> u32 {
    let rings = (radius.km() / resolution.edge_length_km()).ceil() + 1.0;
    if rings.is_finite() && rings < f64::from(MAX_DISK_RINGS) {
        rings.max(1.0) as u32
    } else {
        MAX_DISK_RINGS
    }
}

/// Spatial index over the latest check-in of each entity.
///
/// Borrowed, immutable and cheap to drop: the caller owns the events, the
/// index only stores positions into that slice.
#[derive(Debug)]
pub struct ProximityIndex<'a> {
    events: &'a [CheckInEvent],
    resolution: Resolution,
    by_cell: HashMap<CellIndex, Vec<usize>>,
}

impl<'a> ProximityIndex<'a> {
    /// Index the snapshot. Only each entity's most recent event counts; an
    /// entity whose most recent event is a check-out is not indexed.
    pub fn build(events: &'a [CheckInEvent], resolution: Resolution) -> Result<Self> {
        let mut latest: HashMap<&str, usize> = HashMap::new();
        for (i, event) in events.iter().enumerate() {
            event.coord.validate()?;
            match latest.entry(event.entity_id.as_str()) {
                Entry::Vacant(slot) => {
                    slot.insert(i);
                }
                Entry::Occupied(mut slot) => {
                    if event.timestamp >= events[*slot.get()].timestamp {
                        slot.insert(i);
                    }
                }
            }
        }

        let mut by_cell: HashMap<CellIndex, Vec<usize>> = HashMap::new();
        for &i in latest.values() {
            let event = &events[i];
            if event.kind != CheckInKind::CheckIn {
                continue;
            }
            let cell = cell_for(&event.coord, resolution)?;
            by_cell.entry(cell).or_default().push(i);
        }

        Ok(Self {
            events,
            resolution,
            by_cell,
        })
    }

    /// Number of indexed (checked-in) entities.
    pub fn len(&self) -> usize {
        self.by_cell.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_cell.is_empty()
    }

    fn candidate_indices(&self, point: &Coordinate, radius: Distance) -> Result<Vec<usize>> {
        let rings = disk_rings(radius, self.resolution);
        if rings >= MAX_DISK_RINGS {
            return Ok(self.by_cell.values().flatten().copied().collect());
        }
        let origin = cell_for(point, self.resolution)?;
        Ok(origin
            .grid_disk::<Vec<_>>(rings)
            .iter()
            .filter_map(|cell| self.by_cell.get(cell))
            .flatten()
            .copied()
            .collect())
    }

    /// Events within `max_distance` of `point` and no older than `max_age`
    /// at `now`, nearest first. Future timestamps count as age zero.
    pub fn query(
        &self,
        point: &Coordinate,
        now: DateTime<Utc>,
        max_distance: Distance,
        max_age: Duration,
    ) -> Result<Vec<(&'a CheckInEvent, Distance)>> {
        point.validate()?;
        let events = self.events;
        let mut hits = Vec::new();
        for i in self.candidate_indices(point, max_distance)? {
            let event = &events[i];
            let age = now.signed_duration_since(event.timestamp).max(Duration::zero());
            if age > max_age {
                continue;
            }
            let d = distance(point, &event.coord)?;
            if d <= max_distance {
                hits.push((event, d));
            }
        }
        hits.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.entity_id.cmp(&b.0.entity_id))
        });
        Ok(hits)
    }

    /// [`ProximityIndex::query`] plus driver resolution. Events whose owner
    /// the directory cannot resolve are dropped.
    pub fn find_nearby<D>(
        &self,
        point: &Coordinate,
        now: DateTime<Utc>,
        config: &ProximityConfig,
        directory: &D,
    ) -> Result<Vec<NearbyDriver<'a>>>
    where
        D: DriverDirectory + ?Sized,
    {
        let hits = self.query(point, now, config.max_distance(), config.max_age())?;
        let candidates = hits.len();
        let nearby: Vec<NearbyDriver<'a>> = hits
            .into_iter()
            .filter_map(|(event, distance)| match directory.lookup(&event.entity_id) {
                Some(driver) => Some(NearbyDriver {
                    driver,
                    event,
                    distance,
                }),
                None => {
                    warn!(entity_id = %event.entity_id, "dropping check-in with unknown owner");
                    None
                }
            })
            .collect();
        debug!(
            indexed = self.len(),
            candidates,
            resolved = nearby.len(),
            "nearby driver lookup"
        );
        Ok(nearby)
    }
}

/// Active drivers near `point`, nearest first.
///
/// An event qualifies when `now - timestamp <= max_age` and its distance to
/// `point` is at most `max_distance` (both from `config`).
pub fn find_nearby<'a, D>(
    point: &Coordinate,
    events: &'a [CheckInEvent],
    now: DateTime<Utc>,
    config: &ProximityConfig,
    directory: &D,
) -> Result<Vec<NearbyDriver<'a>>>
where
    D: DriverDirectory + ?Sized,
{
    let resolution = Resolution::try_from(config.h3_resolution)
        .map_err(|_| GeoError::InvalidConfig(format!("h3 resolution {}", config.h3_resolution)))?;
    ProximityIndex::build(events, resolution)?.find_nearby(point, now, config, directory)
}
