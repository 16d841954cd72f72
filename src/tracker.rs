mod detection;
mod dwell_tracker;
mod mask;
mod person;
mod rect;
mod report;
mod zone;
mod zone_state;

pub use detection::{TrackId, TrackedDetection};
pub use dwell_tracker::{
    DEFAULT_SERVICE_CONFIRM_SECS, TrackerConfig, TrackerError, ZoneDwellTracker,
};
pub use mask::{ZoneMask, ZoneMaskError, ZoneMasks};
pub use person::TrackedPerson;
pub use rect::Rect;
pub use report::{DisplayStatus, FrameReport, StatusColor, TrackAnnotation, ZoneCounts};
pub use zone::{Zone, ZoneMembership, ZonePredicate};
pub use zone_state::ZoneState;
