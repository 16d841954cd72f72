//! Per-frame overlay and statistics payload.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::tracker::detection::TrackId;
use crate::tracker::rect::Rect;
use crate::tracker::zone::{Zone, ZoneMembership};

/// Visual class of a track's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Serving,
    Waiting,
    Staff,
    Neutral,
}

impl StatusColor {
    /// BGR triple used when drawing.
    pub fn bgr(self) -> [u8; 3] {
        match self {
            StatusColor::Serving => [0, 255, 0],
            StatusColor::Waiting => [0, 0, 255],
            StatusColor::Staff => [255, 0, 0],
            StatusColor::Neutral => [200, 200, 200],
        }
    }
}

/// Single displayed status of a track in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "zone", rename_all = "lowercase")]
pub enum DisplayStatus {
    Serving { dwell: f64 },
    Waiting { dwell: f64 },
    Staff { dwell: f64 },
    Outside,
}

impl DisplayStatus {
    /// Pick one status with priority serving > waiting > staff > outside.
    ///
    /// A track whose service is confirmed is never shown as waiting.
    pub fn derive(
        membership: ZoneMembership,
        service_confirmed: bool,
        wait_dwell: f64,
        service_dwell: f64,
        staff_dwell: f64,
    ) -> Self {
        if membership.serving {
            DisplayStatus::Serving {
                dwell: service_dwell,
            }
        } else if membership.waiting && !service_confirmed {
            DisplayStatus::Waiting { dwell: wait_dwell }
        } else if membership.staff {
            DisplayStatus::Staff { dwell: staff_dwell }
        } else {
            DisplayStatus::Outside
        }
    }

    pub fn zone(&self) -> Option<Zone> {
        match self {
            DisplayStatus::Serving { .. } => Some(Zone::Serving),
            DisplayStatus::Waiting { .. } => Some(Zone::Waiting),
            DisplayStatus::Staff { .. } => Some(Zone::Staff),
            DisplayStatus::Outside => None,
        }
    }

    pub fn dwell(&self) -> Option<f64> {
        match *self {
            DisplayStatus::Serving { dwell }
            | DisplayStatus::Waiting { dwell }
            | DisplayStatus::Staff { dwell } => Some(dwell),
            DisplayStatus::Outside => None,
        }
    }

    pub fn color(&self) -> StatusColor {
        match self {
            DisplayStatus::Serving { .. } => StatusColor::Serving,
            DisplayStatus::Waiting { .. } => StatusColor::Waiting,
            DisplayStatus::Staff { .. } => StatusColor::Staff,
            DisplayStatus::Outside => StatusColor::Neutral,
        }
    }

    /// Short label such as `Waiting: 12s`.
    pub fn label(&self) -> String {
        match *self {
            DisplayStatus::Serving { dwell } => format!("Serving: {dwell:.0}s"),
            DisplayStatus::Waiting { dwell } => format!("Waiting: {dwell:.0}s"),
            DisplayStatus::Staff { dwell } => format!("Staff: {dwell:.0}s"),
            DisplayStatus::Outside => "Outside".to_string(),
        }
    }
}

/// What to draw for one track.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackAnnotation {
    pub track_id: TrackId,
    pub bbox: Rect,
    pub status: DisplayStatus,
    /// Text drawn above the box, e.g. `#7 Waiting: 2s`
    pub label: String,
    pub color: StatusColor,
}

impl TrackAnnotation {
    pub fn new(track_id: TrackId, bbox: Rect, status: DisplayStatus) -> Self {
        Self {
            track_id,
            bbox,
            label: format!("#{track_id} {}", status.label()),
            color: status.color(),
            status,
        }
    }
}

/// Number of tracks shown in each zone in a frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ZoneCounts {
    pub serving: usize,
    pub waiting: usize,
    pub staff: usize,
}

impl ZoneCounts {
    pub fn record(&mut self, status: &DisplayStatus) {
        match status.zone() {
            Some(Zone::Serving) => self.serving += 1,
            Some(Zone::Waiting) => self.waiting += 1,
            Some(Zone::Staff) => self.staff += 1,
            None => {}
        }
    }

    pub fn get(&self, zone: Zone) -> usize {
        match zone {
            Zone::Serving => self.serving,
            Zone::Waiting => self.waiting,
            Zone::Staff => self.staff,
        }
    }

    /// Summary lines for the statistics panel, in drawing order.
    pub fn overlay_lines(&self) -> [(String, StatusColor); 3] {
        [
            (format!("Serving: {}", self.serving), StatusColor::Serving),
            (format!("Waiting: {}", self.waiting), StatusColor::Waiting),
            (format!("Staff: {}", self.staff), StatusColor::Staff),
        ]
    }
}

/// Result of processing one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    pub timestamp: DateTime<Utc>,
    pub tracks: Vec<TrackAnnotation>,
    pub counts: ZoneCounts,
    /// Tracks finalized in this frame
    pub finished: Vec<TrackId>,
}

impl FrameReport {
    pub fn track(&self, track_id: TrackId) -> Option<&TrackAnnotation> {
        self.tracks.iter().find(|t| t.track_id == track_id)
    }
}
