//! Queue monitoring on top of an upstream multi-object tracker.
//!
//! Each frame's tracked detections are classified against the waiting,
//! serving and staff zones, per-track dwell timers are advanced, and a
//! lifecycle record (entry, wait, service, exit) is kept in a
//! [`PersonRepository`](persistence::PersonRepository).

pub mod config;
pub mod integration;
pub mod persistence;
pub mod tracker;

pub use config::{ConfigError, QueueConfig, ZoneConfig};
pub use integration::{QueuePipeline, TrackSource, TrackedFrame};
pub use persistence::{InMemoryRepository, PersonRecord, PersonRepository, RepositoryError};
pub use tracker::{
    FrameReport, Rect, TrackId, TrackedDetection, TrackerConfig, TrackerError, Zone, ZoneCounts,
    ZoneDwellTracker, ZoneMask, ZoneMasks, ZonePredicate,
};
