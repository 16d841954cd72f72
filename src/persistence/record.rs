use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tracker::TrackId;

/// Lifecycle of one person, keyed by track id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub track_id: TrackId,
    /// First observation; never overwritten
    pub enter_time: DateTime<Utc>,
    /// Last known wait, in seconds
    pub wait_time: f64,
    /// Start of the first serving interval
    pub service_start: Option<DateTime<Utc>>,
    /// Duration of the first completed serving interval, in seconds
    pub service_time: f64,
    /// Set once, when the track is gone
    pub exit_time: Option<DateTime<Utc>>,
}

impl PersonRecord {
    pub fn new(track_id: TrackId, enter_time: DateTime<Utc>) -> Self {
        Self {
            track_id,
            enter_time,
            wait_time: 0.0,
            service_start: None,
            service_time: 0.0,
            exit_time: None,
        }
    }

    pub fn has_exited(&self) -> bool {
        self.exit_time.is_some()
    }

    /// Stamp the exit time unless one is already set.
    ///
    /// Returns whether the record changed.
    pub fn stamp_exit(&mut self, now: DateTime<Utc>) -> bool {
        if self.exit_time.is_some() {
            return false;
        }
        self.exit_time = Some(now.max(self.enter_time));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    #[test]
    fn test_stamp_exit_once() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut record = PersonRecord::new(3, t0);
        assert!(!record.has_exited());

        assert!(record.stamp_exit(t0 + TimeDelta::seconds(4)));
        assert!(!record.stamp_exit(t0 + TimeDelta::seconds(9)));
        assert_eq!(record.exit_time, Some(t0 + TimeDelta::seconds(4)));
    }

    #[test]
    fn test_exit_never_precedes_entry() {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let mut record = PersonRecord::new(3, t0);
        record.stamp_exit(t0 - TimeDelta::seconds(1));
        assert_eq!(record.exit_time, Some(t0));
    }
}
