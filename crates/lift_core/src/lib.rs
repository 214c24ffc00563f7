//! Geospatial lift matching and route planning for trade-plate drivers.
//!
//! Every operation is a pure function over borrowed snapshots supplied by the
//! caller. The only side effects go through the [`collaborators`] traits.

pub mod collaborators;
pub mod collision;
pub mod config;
pub mod density;
pub mod error;
pub mod geo;
pub mod matching;
pub mod model;
pub mod polyline;
pub mod proximity;
pub mod routing;
pub mod traffic;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use collision::{detect_schedule_collisions, notify_schedule_collisions};
pub use config::EngineConfig;
pub use density::{density_for_route, point_near_polyline};
pub use error::{GeoError, Result};
pub use geo::{distance, Distance};
pub use matching::{rank_offers_for_request, rank_requests_for_offer, score};
pub use polyline::{decode_polyline, encode_polyline};
pub use proximity::find_nearby;
pub use routing::{order_legs, plan_route};
pub use traffic::estimate_minutes;
