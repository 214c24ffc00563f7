//! Error taxonomy for the matching engine.
//!
//! Every variant is a local input-validation failure: it points at a caller
//! bug, is surfaced immediately, and is never worth retrying. Empty inputs are
//! not errors anywhere in the engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeoError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude outside [-90, 90], longitude outside [-180, 180], or a
    /// non-finite component.
    #[error("invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    /// A timestamp that cannot be parsed, or a window whose end precedes its start.
    #[error("invalid time range: {0}")]
    InvalidTimeRange(String),

    #[error("invalid polyline at byte {position}: {reason}")]
    InvalidPolyline { position: usize, reason: &'static str },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
