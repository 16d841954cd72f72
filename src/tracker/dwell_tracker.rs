//! Zone dwell tracker: per-frame timer updates and track finalization.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::persistence::{PersonRecord, PersonRepository, RepositoryError};
use crate::tracker::detection::{TrackId, TrackedDetection};
use crate::tracker::person::TrackedPerson;
use crate::tracker::report::{DisplayStatus, FrameReport, TrackAnnotation, ZoneCounts};
use crate::tracker::zone::{ZoneMembership, ZonePredicate};

/// Continuous serving dwell after which a track counts as served.
pub const DEFAULT_SERVICE_CONFIRM_SECS: f64 = 5.0;

/// Configuration for the ZoneDwellTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub service_confirm_secs: f64,
    /// Track ids ignored entirely
    pub exclude_ids: Vec<TrackId>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            service_confirm_secs: DEFAULT_SERVICE_CONFIRM_SECS,
            exclude_ids: Vec::new(),
        }
    }
}

/// Error type for frame processing failures.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("persistence failed for track {track_id}: {source}")]
    Persistence {
        track_id: TrackId,
        #[source]
        source: RepositoryError,
    },
}

fn persistence(track_id: TrackId) -> impl FnOnce(RepositoryError) -> TrackerError {
    move |source| TrackerError::Persistence { track_id, source }
}

pub struct ZoneDwellTracker<P, R> {
    zones: P,
    repository: R,
    config: TrackerConfig,
    excluded: HashSet<TrackId>,
    people: HashMap<TrackId, TrackedPerson>,
}

impl<P: ZonePredicate, R: PersonRepository> ZoneDwellTracker<P, R> {
    pub fn new(zones: P, repository: R, config: TrackerConfig) -> Self {
        let excluded = config.exclude_ids.iter().copied().collect();
        Self {
            zones,
            repository,
            config,
            excluded,
            people: HashMap::new(),
        }
    }

    pub fn with_default_config(zones: P, repository: R) -> Self {
        Self::new(zones, repository, TrackerConfig::default())
    }

    /// Process one frame of tracked detections observed at `now`.
    ///
    /// Timers of every detection are advanced, then tracks that are no
    /// longer present are finalized. The first persistence failure aborts
    /// the frame and is returned.
    pub fn process_frame(
        &mut self,
        detections: &[TrackedDetection],
        now: DateTime<Utc>,
    ) -> Result<FrameReport, TrackerError> {
        let mut active = HashSet::with_capacity(detections.len());
        let mut tracks = Vec::with_capacity(detections.len());
        let mut counts = ZoneCounts::default();

        for det in detections {
            if self.excluded.contains(&det.track_id) {
                continue;
            }
            if !active.insert(det.track_id) {
                debug!(track_id = det.track_id, "duplicate track id in frame, ignored");
                continue;
            }

            let (x, y) = det.bbox.reference_point();
            let membership = ZoneMembership::evaluate(&self.zones, x, y);
            let status = self.observe(det.track_id, membership, now)?;

            counts.record(&status);
            tracks.push(TrackAnnotation::new(det.track_id, det.bbox, status));
        }

        let finished = self.finalize(&active, now)?;

        Ok(FrameReport {
            timestamp: now,
            tracks,
            counts,
            finished,
        })
    }

    /// Finalize every remaining track, e.g. at the end of a stream.
    pub fn flush(&mut self, now: DateTime<Utc>) -> Result<Vec<TrackId>, TrackerError> {
        self.finalize(&HashSet::new(), now)
    }

    pub fn person(&self, track_id: TrackId) -> Option<&TrackedPerson> {
        self.people.get(&track_id)
    }

    /// Number of tracks currently held in memory.
    pub fn tracked_count(&self) -> usize {
        self.people.len()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn zones(&self) -> &P {
        &self.zones
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    pub fn into_repository(self) -> R {
        self.repository
    }

    fn observe(
        &mut self,
        track_id: TrackId,
        membership: ZoneMembership,
        now: DateTime<Utc>,
    ) -> Result<DisplayStatus, TrackerError> {
        let person = match self.people.entry(track_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let record = read_or_create(&mut self.repository, track_id, now)?;
                entry.insert(TrackedPerson::new(record, now))
            }
        };

        let status = person.observe(membership, now, self.config.service_confirm_secs);
        if person.is_dirty() {
            self.repository
                .update(person.record())
                .map_err(persistence(track_id))?;
            self.repository.commit().map_err(persistence(track_id))?;
            person.mark_committed();
        }
        Ok(status)
    }

    fn finalize(
        &mut self,
        active: &HashSet<TrackId>,
        now: DateTime<Utc>,
    ) -> Result<Vec<TrackId>, TrackerError> {
        let mut finished: Vec<TrackId> = self
            .people
            .keys()
            .filter(|id| !active.contains(*id))
            .copied()
            .collect();
        finished.sort_unstable();

        // a track leaves memory only once its exit is durable, so a failed
        // write is retried on the next frame
        for &track_id in &finished {
            if let Some(person) = self.people.get(&track_id).cloned() {
                self.retire(person, now)?;
                self.people.remove(&track_id);
            }
        }
        Ok(finished)
    }

    fn retire(
        &mut self,
        mut person: TrackedPerson,
        now: DateTime<Utc>,
    ) -> Result<(), TrackerError> {
        let track_id = person.track_id;
        person.finish();
        let dirty = person.is_dirty();

        let Some(stored) = self
            .repository
            .find_by_track_id(track_id)
            .map_err(persistence(track_id))?
        else {
            debug!(track_id, "no record for finished track, exit not stamped");
            return Ok(());
        };

        let mut record = person.into_record();
        record.exit_time = stored.exit_time;
        let stamped = record.stamp_exit(now);

        if dirty || stamped {
            self.repository
                .update(&record)
                .map_err(persistence(track_id))?;
            self.repository.commit().map_err(persistence(track_id))?;
        }

        info!(
            track_id,
            wait = record.wait_time,
            service = record.service_time,
            "person left"
        );
        Ok(())
    }
}

/// Single read-or-create at first observation; a new record is committed at once.
fn read_or_create<R: PersonRepository>(
    repository: &mut R,
    track_id: TrackId,
    now: DateTime<Utc>,
) -> Result<PersonRecord, TrackerError> {
    if let Some(record) = repository
        .find_by_track_id(track_id)
        .map_err(persistence(track_id))?
    {
        debug!(track_id, "track id seen before, reusing its record");
        return Ok(record);
    }

    let record = repository
        .create(track_id, now)
        .map_err(persistence(track_id))?;
    repository.commit().map_err(persistence(track_id))?;
    info!(track_id, enter_time = %now, "new person");
    Ok(record)
}
