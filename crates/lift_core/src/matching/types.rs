use serde::Serialize;

use crate::geo::Distance;

/// Why a pair scored what it did. Only produced for pairs that passed the
/// route and time gates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub origin_separation: Distance,
    pub destination_separation: Distance,
    pub time_separation_hours: f64,
    pub score: u8,
}
