#![allow(dead_code)]

use std::collections::HashMap;

use lift_core::model::{CheckInEvent, DriverProfile, Job, Offer, Request};
use lift_core::test_helpers::{driver, synthetic_population, SyntheticPopulation};

/// Live collections as the storage layer would hand them to the engine.
#[derive(Clone, Debug, Default)]
pub struct Snapshot {
    pub offers: Vec<Offer>,
    pub requests: Vec<Request>,
    pub jobs: Vec<Job>,
    pub check_ins: Vec<CheckInEvent>,
    pub drivers: HashMap<String, DriverProfile>,
}

impl From<SyntheticPopulation> for Snapshot {
    fn from(population: SyntheticPopulation) -> Self {
        Self {
            offers: population.offers,
            requests: population.requests,
            jobs: population.jobs,
            check_ins: population.check_ins,
            drivers: population.drivers,
        }
    }
}

/// Builder for reproducible test snapshots.
#[derive(Clone, Debug, Default)]
pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a seeded synthetic population of `size` per collection.
    pub fn synthetic(seed: u64, size: usize) -> Self {
        Self {
            snapshot: synthetic_population(seed, size).into(),
        }
    }

    pub fn offer(mut self, offer: Offer) -> Self {
        self.snapshot.offers.push(offer);
        self
    }

    pub fn request(mut self, request: Request) -> Self {
        self.snapshot.requests.push(request);
        self
    }

    pub fn job(mut self, job: Job) -> Self {
        self.snapshot.jobs.push(job);
        self
    }

    /// Add a check-in and register its owner in the directory.
    pub fn check_in(mut self, event: CheckInEvent) -> Self {
        self.snapshot
            .drivers
            .entry(event.entity_id.clone())
            .or_insert_with(|| driver(&event.entity_id));
        self.snapshot.check_ins.push(event);
        self
    }

    /// Add a check-in whose owner the directory does not know.
    pub fn orphan_check_in(mut self, event: CheckInEvent) -> Self {
        self.snapshot.check_ins.push(event);
        self
    }

    pub fn build(self) -> Snapshot {
        self.snapshot
    }
}
