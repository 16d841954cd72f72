//! Integration module for feeding tracked detections into the dwell tracker.
//!
//! This module provides the traits and utilities that connect an upstream
//! multi-object tracker (live or replayed from a log) with the
//! [`ZoneDwellTracker`](crate::tracker::ZoneDwellTracker).

mod pipeline;
mod replay;
mod source;

pub use pipeline::{PipelineError, PipelineSummary, QueuePipeline};
pub use replay::{JsonLinesSource, SourceError};
pub use source::{IntoTrackedDetections, TrackSource, TrackedFrame};
