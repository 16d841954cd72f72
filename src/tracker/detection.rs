//! Tracked detections handed over by the upstream tracker.

use crate::tracker::rect::Rect;

/// Identity assigned to a physical subject by the upstream tracker.
pub type TrackId = u64;

/// One tracked person in a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedDetection {
    /// Identity, stable across consecutive frames for the same subject
    pub track_id: TrackId,
    /// Bounding box in image coordinates
    pub bbox: Rect,
}

impl TrackedDetection {
    pub fn new(track_id: TrackId, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            track_id,
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
        }
    }

    pub fn from_rect(track_id: TrackId, bbox: Rect) -> Self {
        Self { track_id, bbox }
    }
}
