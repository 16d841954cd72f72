//! QueuePipeline for combining a track source with the dwell tracker.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::persistence::PersonRepository;
use crate::tracker::{
    FrameReport, TrackId, TrackerConfig, TrackerError, ZoneDwellTracker, ZonePredicate,
};

use super::TrackSource;

/// Error type for pipeline failures.
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("track source failed: {0}")]
    Source(#[source] E),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Totals of a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSummary {
    pub frames: usize,
    /// Every track id that reached the tracker
    pub track_ids: BTreeSet<TrackId>,
    pub last_timestamp: Option<DateTime<Utc>>,
}

/// A frame loop that bundles a `TrackSource` with the `ZoneDwellTracker`.
pub struct QueuePipeline<S: TrackSource, P, R> {
    source: S,
    tracker: ZoneDwellTracker<P, R>,
    summary: PipelineSummary,
}

impl<S, P, R> QueuePipeline<S, P, R>
where
    S: TrackSource,
    P: ZonePredicate,
    R: PersonRepository,
{
    /// Create a new pipeline with the given source, zones, repository and tracker config.
    pub fn new(source: S, zones: P, repository: R, config: TrackerConfig) -> Self {
        Self {
            source,
            tracker: ZoneDwellTracker::new(zones, repository, config),
            summary: PipelineSummary::default(),
        }
    }

    /// Create a new pipeline with default tracker configuration.
    pub fn with_default_config(source: S, zones: P, repository: R) -> Self {
        Self::new(source, zones, repository, TrackerConfig::default())
    }

    /// Pull one frame from the source and run it through the tracker.
    ///
    /// Returns `None` once the source is exhausted.
    pub fn process_frame(&mut self) -> Result<Option<FrameReport>, PipelineError<S::Error>> {
        let Some(frame) = self.source.next_frame().map_err(PipelineError::Source)? else {
            return Ok(None);
        };

        let report = self
            .tracker
            .process_frame(&frame.detections, frame.timestamp)?;

        self.summary.frames += 1;
        self.summary
            .track_ids
            .extend(report.tracks.iter().map(|t| t.track_id));
        self.summary.last_timestamp = Some(frame.timestamp);
        Ok(Some(report))
    }

    /// Drain the source, then finalize the tracks still in view at the last frame.
    pub fn run(&mut self) -> Result<PipelineSummary, PipelineError<S::Error>> {
        self.run_with(|_| {})
    }

    /// Like [`run`](Self::run), handing every frame report to `on_frame`.
    pub fn run_with<F>(
        &mut self,
        mut on_frame: F,
    ) -> Result<PipelineSummary, PipelineError<S::Error>>
    where
        F: FnMut(&FrameReport),
    {
        while let Some(report) = self.process_frame()? {
            on_frame(&report);
        }
        if let Some(last) = self.summary.last_timestamp {
            self.tracker.flush(last)?;
        }
        Ok(self.summary.clone())
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &ZoneDwellTracker<P, R> {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut ZoneDwellTracker<P, R> {
        &mut self.tracker
    }

    pub fn into_tracker(self) -> ZoneDwellTracker<P, R> {
        self.tracker
    }
}
