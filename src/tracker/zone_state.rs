use chrono::{DateTime, Utc};

/// Dwell state of one track in one zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneState {
    /// No open dwell interval
    #[default]
    Outside,
    /// Dwell interval opened at `since`
    Inside { since: DateTime<Utc> },
}

impl ZoneState {
    pub fn is_inside(&self) -> bool {
        matches!(self, ZoneState::Inside { .. })
    }

    /// When the open interval started, if any.
    pub fn since(&self) -> Option<DateTime<Utc>> {
        match self {
            ZoneState::Inside { since } => Some(*since),
            ZoneState::Outside => None,
        }
    }

    /// Open the interval if needed and return the dwell so far.
    pub fn open(&mut self, now: DateTime<Utc>) -> f64 {
        match *self {
            ZoneState::Inside { since } => elapsed_secs(since, now),
            ZoneState::Outside => {
                *self = ZoneState::Inside { since: now };
                0.0
            }
        }
    }

    /// Close the interval, returning its final dwell if one was open.
    pub fn close(&mut self, now: DateTime<Utc>) -> Option<f64> {
        let since = self.since()?;
        *self = ZoneState::Outside;
        Some(elapsed_secs(since, now))
    }
}

/// Seconds from `from` to `to`, millisecond resolution, never negative.
pub(crate) fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    ((to - from).num_milliseconds() as f64 / 1000.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap() + TimeDelta::seconds(secs)
    }

    #[test]
    fn test_open_then_continue() {
        let mut state = ZoneState::default();
        assert!(!state.is_inside());

        assert_eq!(state.open(t(0)), 0.0);
        assert_eq!(state.since(), Some(t(0)));
        assert_eq!(state.open(t(3)), 3.0);
        // continuing does not move the start
        assert_eq!(state.since(), Some(t(0)));
    }

    #[test]
    fn test_close() {
        let mut state = ZoneState::default();
        assert_eq!(state.close(t(1)), None);

        state.open(t(1));
        assert_eq!(state.close(t(4)), Some(3.0));
        assert_eq!(state, ZoneState::Outside);
    }

    #[test]
    fn test_elapsed_never_negative() {
        assert_eq!(elapsed_secs(t(5), t(2)), 0.0);
        assert_eq!(
            elapsed_secs(t(0), t(0) + TimeDelta::milliseconds(1500)),
            1.5
        );
    }
}
