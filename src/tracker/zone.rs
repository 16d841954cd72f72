use serde::{Deserialize, Serialize};

/// Region of the frame a person can dwell in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Queue area in front of the counter
    Waiting,
    /// Counter area where a customer is being served
    Serving,
    /// Area behind the counter
    Staff,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::Waiting, Zone::Serving, Zone::Staff];

    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Waiting => "waiting",
            Zone::Serving => "serving",
            Zone::Staff => "staff",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-zone test.
///
/// Zones are not required to be disjoint; a point may be inside several.
/// A point outside the zone's bounds, or a zone that is not configured,
/// must report `false`.
pub trait ZonePredicate {
    fn is_inside(&self, zone: Zone, x: i64, y: i64) -> bool;
}

impl<P: ZonePredicate + ?Sized> ZonePredicate for &P {
    fn is_inside(&self, zone: Zone, x: i64, y: i64) -> bool {
        (**self).is_inside(zone, x, y)
    }
}

/// Zone membership of a single reference point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneMembership {
    pub waiting: bool,
    pub serving: bool,
    pub staff: bool,
}

impl ZoneMembership {
    pub fn evaluate<P: ZonePredicate + ?Sized>(zones: &P, x: i64, y: i64) -> Self {
        Self {
            waiting: zones.is_inside(Zone::Waiting, x, y),
            serving: zones.is_inside(Zone::Serving, x, y),
            staff: zones.is_inside(Zone::Staff, x, y),
        }
    }

    pub fn contains(&self, zone: Zone) -> bool {
        match zone {
            Zone::Waiting => self.waiting,
            Zone::Serving => self.serving,
            Zone::Staff => self.staff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LeftHalfServing;

    impl ZonePredicate for LeftHalfServing {
        fn is_inside(&self, zone: Zone, x: i64, _y: i64) -> bool {
            zone == Zone::Serving && x < 50
        }
    }

    #[test]
    fn test_evaluate_membership() {
        let m = ZoneMembership::evaluate(&LeftHalfServing, 10, 10);
        assert!(m.serving);
        assert!(!m.waiting);
        assert!(!m.staff);
        assert!(m.contains(Zone::Serving));

        let m = ZoneMembership::evaluate(&LeftHalfServing, 80, 10);
        assert_eq!(m, ZoneMembership::default());
    }

    #[test]
    fn test_zone_serde_names() {
        let json = serde_json::to_string(&Zone::Staff).unwrap();
        assert_eq!(json, "\"staff\"");
        assert_eq!(Zone::Waiting.to_string(), "waiting");
    }
}
