//! Seams to the services the engine depends on but does not own.

use std::collections::HashMap;

use crate::collision::CollisionMatch;
use crate::model::DriverProfile;

/// Resolves a driver id to display data. Implementations must be read-only
/// from the engine's point of view.
pub trait DriverDirectory: Send + Sync {
    fn lookup(&self, driver_id: &str) -> Option<DriverProfile>;
}

impl DriverDirectory for HashMap<String, DriverProfile> {
    fn lookup(&self, driver_id: &str) -> Option<DriverProfile> {
        self.get(driver_id).cloned()
    }
}

/// Delivery channel for schedule-collision notifications (push, inbox, ...).
///
/// The engine only builds the payload; delivery semantics belong to the sink.
pub trait NotificationSink {
    fn emit(&mut self, record: &CollisionMatch);
}

impl NotificationSink for Vec<CollisionMatch> {
    fn emit(&mut self, record: &CollisionMatch) {
        self.push(record.clone());
    }
}
