//! JSON inputs: the live-collection snapshot, engine config and leg lists.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use lift_core::config::EngineConfig;
use lift_core::model::{CheckInEvent, DriverProfile, Job, Leg, Offer, Request};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// What the storage layer would hand the engine. Every collection is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Snapshot {
    pub offers: Vec<Offer>,
    pub requests: Vec<Request>,
    pub jobs: Vec<Job>,
    pub check_ins: Vec<CheckInEvent>,
    pub drivers: Vec<DriverProfile>,
}

impl Snapshot {
    pub fn offer(&self, id: &str) -> Result<&Offer> {
        self.offers
            .iter()
            .find(|o| o.id == id)
            .ok_or_else(|| anyhow!("no offer with id '{id}' in snapshot"))
    }

    pub fn request(&self, id: &str) -> Result<&Request> {
        self.requests
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| anyhow!("no request with id '{id}' in snapshot"))
    }

    pub fn job(&self, id: &str) -> Result<&Job> {
        self.jobs
            .iter()
            .find(|j| j.id == id)
            .ok_or_else(|| anyhow!("no job with id '{id}' in snapshot"))
    }

    pub fn directory(&self) -> HashMap<String, DriverProfile> {
        self.drivers
            .iter()
            .map(|d| (d.id.clone(), d.clone()))
            .collect()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading {what} from {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {what} in {}", path.display()))
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let snapshot: Snapshot = read_json(path, "snapshot")?;
    debug!(
        offers = snapshot.offers.len(),
        requests = snapshot.requests.len(),
        jobs = snapshot.jobs.len(),
        check_ins = snapshot.check_ins.len(),
        drivers = snapshot.drivers.len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

/// Defaults when `path` is `None`; otherwise the file overrides what it names.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let config = match path {
        Some(path) => read_json(path, "config")?,
        None => EngineConfig::default(),
    };
    config.validate().context("invalid engine config")?;
    Ok(config)
}

pub fn load_legs(path: &Path) -> Result<Vec<Leg>> {
    read_json(path, "legs")
}
