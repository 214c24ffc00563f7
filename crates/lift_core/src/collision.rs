//! Schedule collisions: two drivers whose jobs end near each other, close
//! together in time, may be able to share a lift home.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use crate::collaborators::NotificationSink;
use crate::config::CollisionConfig;
use crate::error::Result;
use crate::geo::{distance, Distance};
use crate::model::{Coordinate, Job};

/// One directed notification: `user_id` learns where and when
/// `matched_user_id` finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionMatch {
    pub user_id: String,
    pub matched_user_id: String,
    pub job_id: String,
    pub matched_job_id: String,
    pub location: Coordinate,
    pub time: DateTime<Utc>,
    pub distance: Distance,
}

/// Both directions of a single collision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollisionPair {
    pub forward: CollisionMatch,
    pub reverse: CollisionMatch,
}

impl CollisionPair {
    fn between(job: &Job, other: &Job, separation: Distance) -> Self {
        Self {
            forward: CollisionMatch {
                user_id: job.user_id.clone(),
                matched_user_id: other.user_id.clone(),
                job_id: job.id.clone(),
                matched_job_id: other.id.clone(),
                location: other.to,
                time: other.estimated_end_time,
                distance: separation,
            },
            reverse: CollisionMatch {
                user_id: other.user_id.clone(),
                matched_user_id: job.user_id.clone(),
                job_id: other.id.clone(),
                matched_job_id: job.id.clone(),
                location: job.to,
                time: job.estimated_end_time,
                distance: separation,
            },
        }
    }

    pub fn records(&self) -> [&CollisionMatch; 2] {
        [&self.forward, &self.reverse]
    }
}

/// Every active job of another user whose destination and end time fall
/// within the configured distance and window of `job`.
///
/// Pure: the caller decides what to do with the pairs. Output follows the
/// order of `live_jobs`.
pub fn detect_schedule_collisions(
    job: &Job,
    live_jobs: &[Job],
    config: &CollisionConfig,
) -> Result<Vec<CollisionPair>> {
    job.to.validate()?;
    let max_distance = config.max_distance();
    let max_window = config.max_window();

    let mut pairs = Vec::new();
    for other in live_jobs {
        if other.id == job.id || other.user_id == job.user_id || !other.status.is_active() {
            continue;
        }
        let separation = distance(&job.to, &other.to)?;
        if separation > max_distance {
            trace!(job_id = %job.id, other = %other.id, km = separation.km(), "too far apart");
            continue;
        }
        let gap = (job.estimated_end_time - other.estimated_end_time).abs();
        if gap > max_window {
            trace!(job_id = %job.id, other = %other.id, minutes = gap.num_minutes(), "too far apart in time");
            continue;
        }
        pairs.push(CollisionPair::between(job, other, separation));
    }

    debug!(
        job_id = %job.id,
        candidates = live_jobs.len(),
        pairs = pairs.len(),
        "schedule collision scan"
    );
    Ok(pairs)
}

/// Detect and push both records of every pair to `sink`. Returns the number
/// of records emitted.
pub fn notify_schedule_collisions<S>(
    job: &Job,
    live_jobs: &[Job],
    config: &CollisionConfig,
    sink: &mut S,
) -> Result<usize>
where
    S: NotificationSink + ?Sized,
{
    let pairs = detect_schedule_collisions(job, live_jobs, config)?;
    let mut emitted = 0;
    for pair in &pairs {
        for record in pair.records() {
            sink.emit(record);
            emitted += 1;
        }
    }
    Ok(emitted)
}
