//! Per-track dwell bookkeeping.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::persistence::PersonRecord;
use crate::tracker::detection::TrackId;
use crate::tracker::report::DisplayStatus;
use crate::tracker::zone::{Zone, ZoneMembership};
use crate::tracker::zone_state::ZoneState;

/// In-memory state of one tracked person.
#[derive(Debug, Clone)]
pub struct TrackedPerson {
    /// Upstream track identifier
    pub track_id: TrackId,
    /// Open waiting interval
    pub waiting: ZoneState,
    /// Open serving interval
    pub serving: ZoneState,
    /// Open staff interval
    pub staff: ZoneState,
    /// Set once continuous serving dwell reaches the confirmation threshold
    pub service_confirmed: bool,
    /// Last `wait_time` durably written
    pub committed_wait_time: f64,
    /// Last `service_time` durably written
    pub committed_service_time: f64,
    /// Time of the last frame this track was seen in
    pub last_seen: DateTime<Utc>,
    /// Serving dwell as of `last_seen`
    service_dwell: f64,
    record: PersonRecord,
    dirty: bool,
}

impl TrackedPerson {
    /// Start tracking with the record read or created at first observation.
    pub fn new(record: PersonRecord, now: DateTime<Utc>) -> Self {
        Self {
            track_id: record.track_id,
            waiting: ZoneState::Outside,
            serving: ZoneState::Outside,
            staff: ZoneState::Outside,
            service_confirmed: false,
            committed_wait_time: record.wait_time,
            committed_service_time: record.service_time,
            last_seen: now,
            service_dwell: 0.0,
            record,
            dirty: false,
        }
    }

    /// Cached copy of the durable record, including uncommitted changes.
    pub fn record(&self) -> &PersonRecord {
        &self.record
    }

    pub fn zone_state(&self, zone: Zone) -> ZoneState {
        match zone {
            Zone::Waiting => self.waiting,
            Zone::Serving => self.serving,
            Zone::Staff => self.staff,
        }
    }

    /// Whether any zone interval is open.
    pub fn has_open_interval(&self) -> bool {
        Zone::ALL.iter().any(|&zone| self.zone_state(zone).is_inside())
    }

    /// Whether the cached record differs from what was last committed.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Advance all zone timers for one observation and derive the display status.
    pub fn observe(
        &mut self,
        membership: ZoneMembership,
        now: DateTime<Utc>,
        confirm_secs: f64,
    ) -> DisplayStatus {
        self.last_seen = now;

        let wait_dwell = if membership.waiting && !self.service_confirmed {
            let dwell = self.waiting.open(now);
            self.set_wait_time(dwell);
            dwell
        } else {
            if let Some(dwell) = self.waiting.close(now) {
                // closed by confirmation: keep what was already committed
                if !self.service_confirmed {
                    self.set_wait_time(dwell);
                }
                debug!(track_id = self.track_id, wait = dwell, "left waiting zone");
            }
            0.0
        };

        let service_dwell = if membership.serving {
            let dwell = self.serving.open(now);
            self.service_dwell = dwell;
            if !self.service_confirmed && dwell >= confirm_secs {
                self.service_confirmed = true;
                info!(track_id = self.track_id, dwell, "service confirmed");
            }
            dwell
        } else {
            if let ZoneState::Inside { since } = self.serving {
                let dwell = self.serving.close(now).unwrap_or_default();
                debug!(track_id = self.track_id, service = dwell, "left serving zone");
                self.complete_service(since, dwell);
            }
            0.0
        };

        let staff_dwell = if membership.staff {
            self.staff.open(now)
        } else {
            self.staff.close(now);
            0.0
        };

        DisplayStatus::derive(
            membership,
            self.service_confirmed,
            wait_dwell,
            service_dwell,
            staff_dwell,
        )
    }

    /// Close every interval at the dwell observed on the last frame the track was present.
    pub fn finish(&mut self) {
        if let Some(since) = self.serving.since() {
            self.complete_service(since, self.service_dwell);
        }
        self.waiting = ZoneState::Outside;
        self.serving = ZoneState::Outside;
        self.staff = ZoneState::Outside;
    }

    /// Record that the cached record is now durable.
    pub fn mark_committed(&mut self) {
        self.committed_wait_time = self.record.wait_time;
        self.committed_service_time = self.record.service_time;
        self.dirty = false;
    }

    /// Give up the cached record, consuming the track.
    pub fn into_record(self) -> PersonRecord {
        self.record
    }

    fn set_wait_time(&mut self, dwell: f64) {
        if dwell != self.record.wait_time {
            self.record.wait_time = dwell;
            self.dirty = true;
        }
    }

    /// First completed service interval wins; later intervals are ignored.
    ///
    /// `service_start` is written together with `service_time` so both
    /// describe the same interval.
    fn complete_service(&mut self, started: DateTime<Utc>, dwell: f64) {
        if self.committed_service_time == 0.0 && self.record.service_time == 0.0 && dwell > 0.0 {
            self.record.service_start = Some(started);
            self.record.service_time = dwell;
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    const CONFIRM: f64 = 5.0;

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + TimeDelta::seconds(secs)
    }

    fn zones(waiting: bool, serving: bool, staff: bool) -> ZoneMembership {
        ZoneMembership {
            waiting,
            serving,
            staff,
        }
    }

    fn person() -> TrackedPerson {
        TrackedPerson::new(PersonRecord::new(1, t(0)), t(0))
    }

    #[test]
    fn test_waiting_dwell_is_written_live() {
        let mut p = person();
        assert_eq!(
            p.observe(zones(true, false, false), t(0), CONFIRM),
            DisplayStatus::Waiting { dwell: 0.0 }
        );
        assert!(!p.is_dirty());

        p.observe(zones(true, false, false), t(2), CONFIRM);
        assert!(p.is_dirty());
        assert_eq!(p.record().wait_time, 2.0);

        p.mark_committed();
        assert_eq!(p.committed_wait_time, 2.0);
        assert!(!p.is_dirty());
    }

    #[test]
    fn test_leaving_waiting_records_final_dwell() {
        let mut p = person();
        p.observe(zones(true, false, false), t(0), CONFIRM);
        p.observe(zones(true, false, false), t(1), CONFIRM);
        let status = p.observe(zones(false, false, false), t(3), CONFIRM);

        assert_eq!(status, DisplayStatus::Outside);
        assert_eq!(p.record().wait_time, 3.0);
        assert!(!p.waiting.is_inside());
    }

    #[test]
    fn test_confirmation_suppresses_waiting() {
        let mut p = person();
        for s in 0..=5 {
            p.observe(zones(true, true, false), t(s), CONFIRM);
        }
        assert!(p.service_confirmed);
        let wait_at_confirmation = p.record().wait_time;

        for s in 6..=9 {
            let status = p.observe(zones(true, false, false), t(s), CONFIRM);
            assert_eq!(status, DisplayStatus::Outside);
        }
        assert_eq!(p.record().wait_time, wait_at_confirmation);
        assert!(!p.waiting.is_inside());
    }

    #[test]
    fn test_service_first_interval_wins() {
        let mut p = person();
        p.observe(zones(false, true, false), t(0), CONFIRM);
        p.observe(zones(false, false, false), t(2), CONFIRM);
        assert_eq!(p.record().service_time, 2.0);
        assert_eq!(p.record().service_start, Some(t(0)));

        p.observe(zones(false, true, false), t(3), CONFIRM);
        p.observe(zones(false, false, false), t(10), CONFIRM);
        assert_eq!(p.record().service_time, 2.0);
        assert_eq!(p.record().service_start, Some(t(0)));
    }

    #[test]
    fn test_zero_length_service_leaves_start_unset() {
        let mut p = person();
        p.observe(zones(false, true, false), t(0), CONFIRM);
        assert_eq!(p.record().service_start, None);
        p.observe(zones(false, false, false), t(0), CONFIRM);
        assert_eq!(p.record().service_start, None);
        assert_eq!(p.record().service_time, 0.0);

        p.observe(zones(false, true, false), t(2), CONFIRM);
        p.observe(zones(false, false, false), t(5), CONFIRM);
        assert_eq!(p.record().service_time, 3.0);
        assert_eq!(p.record().service_start, Some(t(2)));
    }

    #[test]
    fn test_finish_uses_last_observed_service_dwell() {
        let mut p = person();
        p.observe(zones(false, true, false), t(0), CONFIRM);
        p.observe(zones(false, true, false), t(4), CONFIRM);
        p.finish();

        assert_eq!(p.record().service_time, 4.0);
        assert!(!p.has_open_interval());
    }

    #[test]
    fn test_staff_is_display_only() {
        let mut p = person();
        p.observe(zones(false, false, true), t(0), CONFIRM);
        let status = p.observe(zones(false, false, true), t(3), CONFIRM);

        assert_eq!(status, DisplayStatus::Staff { dwell: 3.0 });
        assert!(!p.is_dirty());
        assert_eq!(p.zone_state(Zone::Staff).since(), Some(t(0)));
    }
}
