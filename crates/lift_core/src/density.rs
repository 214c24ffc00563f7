//! Driver density along a route corridor.
//!
//! A candidate (offer or request) counts as compatible with a route when its
//! origin lies within the corridor radius of a route vertex and it heads the
//! same way the route does at that vertex. The density score is the
//! compatible count against an expected baseline.

use std::cmp::Ordering;

use serde::Serialize;
use tracing::debug;

use crate::config::DensityConfig;
use crate::error::Result;
use crate::geo::{angle_diff, bearing, distance, Distance};
use crate::model::{Coordinate, Offer, Request, TimeWindow};
use crate::polyline::decode_polyline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DensityLabel {
    Low,
    Medium,
    High,
}

impl DensityLabel {
    pub fn for_score(score: f64, config: &DensityConfig) -> Self {
        if score < config.medium_threshold {
            DensityLabel::Low
        } else if score < config.high_threshold {
            DensityLabel::Medium
        } else {
            DensityLabel::High
        }
    }
}

/// A corridor vertex that several compatible candidates start closest to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetupPoint {
    pub coord: Coordinate,
    pub vertex_index: usize,
    pub candidates: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDensity {
    pub compatible_offers: usize,
    pub compatible_requests: usize,
    /// `min(1, compatible / expected_baseline)`.
    pub score: f64,
    pub label: DensityLabel,
    pub predicted_available_in_window: usize,
    pub meetup_points: Vec<MeetupPoint>,
}

impl RouteDensity {
    fn empty() -> Self {
        Self {
            compatible_offers: 0,
            compatible_requests: 0,
            score: 0.0,
            label: DensityLabel::Low,
            predicted_available_in_window: 0,
            meetup_points: Vec::new(),
        }
    }
}

/// True if any vertex of `polyline` is within `radius` of `point`.
///
/// Samples vertices only: a point beside the middle of a long straight
/// segment can be missed.
pub fn point_near_polyline(
    point: &Coordinate,
    polyline: &[Coordinate],
    radius: Distance,
) -> Result<bool> {
    for vertex in polyline {
        if distance(point, vertex)? <= radius {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Decoded route plus the heading of the route at each vertex.
struct Corridor {
    vertices: Vec<Coordinate>,
    headings: Vec<f64>,
}

impl Corridor {
    /// `None` for fewer than two vertices.
    fn new(vertices: Vec<Coordinate>) -> Result<Option<Self>> {
        if vertices.len() < 2 {
            return Ok(None);
        }
        let mut headings = Vec::with_capacity(vertices.len());
        for pair in vertices.windows(2) {
            headings.push(bearing(&pair[0], &pair[1])?);
        }
        // Last vertex keeps the heading of the final segment.
        let last = headings[headings.len() - 1];
        headings.push(last);
        Ok(Some(Self { vertices, headings }))
    }

    fn nearest_vertex(&self, point: &Coordinate) -> Result<(usize, Distance)> {
        let mut best = (0, distance(point, &self.vertices[0])?);
        for (i, vertex) in self.vertices.iter().enumerate().skip(1) {
            let d = distance(point, vertex)?;
            if d.partial_cmp(&best.1) == Some(Ordering::Less) {
                best = (i, d);
            }
        }
        Ok(best)
    }

    /// Vertex the candidate attaches to, if it is inside the corridor and
    /// heading the same way. A candidate whose origin equals its destination
    /// has no heading and never attaches.
    fn attach(
        &self,
        from: &Coordinate,
        to: &Coordinate,
        config: &DensityConfig,
    ) -> Result<Option<usize>> {
        if distance(from, to)? == Distance::ZERO {
            return Ok(None);
        }
        let (index, d) = self.nearest_vertex(from)?;
        if d > config.corridor_radius() {
            return Ok(None);
        }
        let heading = bearing(from, to)?;
        if angle_diff(heading, self.headings[index]) > config.min_bearing_match_deg {
            return Ok(None);
        }
        Ok(Some(index))
    }
}

/// Density of active offers and requests along the encoded route.
///
/// Fewer than two decoded vertices yields zero density rather than an error.
pub fn density_for_route(
    encoded: &str,
    offers: &[Offer],
    requests: &[Request],
    window: &TimeWindow,
    config: &DensityConfig,
) -> Result<RouteDensity> {
    window.validate()?;
    let Some(corridor) = Corridor::new(decode_polyline(encoded)?)? else {
        return Ok(RouteDensity::empty());
    };

    let mut per_vertex = vec![0_usize; corridor.vertices.len()];
    let mut compatible_offers = 0;
    let mut compatible_requests = 0;
    let mut in_window = 0;

    for offer in offers.iter().filter(|o| o.status.is_active()) {
        if let Some(index) = corridor.attach(&offer.from, &offer.to, config)? {
            per_vertex[index] += 1;
            compatible_offers += 1;
            if window.contains(offer.departure_time) {
                in_window += 1;
            }
        }
    }
    for request in requests.iter().filter(|r| r.status.is_active()) {
        if let Some(index) = corridor.attach(&request.from, &request.to, config)? {
            per_vertex[index] += 1;
            compatible_requests += 1;
            if window.contains(request.requested_time) {
                in_window += 1;
            }
        }
    }

    let compatible = compatible_offers + compatible_requests;
    let score = (compatible as f64 / config.expected_baseline).min(1.0);

    let mut meetup_points: Vec<MeetupPoint> = per_vertex
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count > 0)
        .map(|(i, &count)| MeetupPoint {
            coord: corridor.vertices[i],
            vertex_index: i,
            candidates: count,
        })
        .collect();
    meetup_points.sort_by(|a, b| {
        b.candidates
            .cmp(&a.candidates)
            .then(a.vertex_index.cmp(&b.vertex_index))
    });
    meetup_points.truncate(config.max_meetup_points);

    debug!(
        vertices = corridor.vertices.len(),
        offers = offers.len(),
        requests = requests.len(),
        compatible,
        in_window,
        "route density"
    );

    Ok(RouteDensity {
        compatible_offers,
        compatible_requests,
        score,
        label: DensityLabel::for_score(score, config),
        predicted_available_in_window: in_window,
        meetup_points,
    })
}
