//! Trait for upstream tracking backends.

use chrono::{DateTime, Utc};

use crate::tracker::{TrackId, TrackedDetection};

/// All tracked detections of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedFrame {
    /// Wall-clock time the frame was captured, monotonic across frames
    pub timestamp: DateTime<Utc>,
    pub detections: Vec<TrackedDetection>,
}

/// Trait for upstream detection + tracking backends.
///
/// Implement this trait to connect any detector/tracker to the dwell tracker.
///
/// # Example
///
/// ```ignore
/// use queue_dwell::{TrackSource, TrackedFrame};
///
/// struct CameraTracker {
///     // Your model and tracker here
/// }
///
/// impl TrackSource for CameraTracker {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<TrackedFrame>, Self::Error> {
///         // Decode a frame, detect people, associate track ids
///         Ok(None)
///     }
/// }
/// ```
pub trait TrackSource {
    /// Error type for source failures.
    type Error;

    /// Produce the next frame, or `None` at the end of the stream.
    fn next_frame(&mut self) -> Result<Option<TrackedFrame>, Self::Error>;
}

/// Helper trait for converting tracker-specific outputs to `TrackedDetection`.
pub trait IntoTrackedDetections {
    /// Convert the output into a vector of tracked detections.
    fn into_tracked_detections(self) -> Vec<TrackedDetection>;
}

impl IntoTrackedDetections for Vec<TrackedDetection> {
    fn into_tracked_detections(self) -> Vec<TrackedDetection> {
        self
    }
}

/// `(track_id, [x1, y1, x2, y2])` pairs, as most trackers report them.
impl IntoTrackedDetections for Vec<(TrackId, [f32; 4])> {
    fn into_tracked_detections(self) -> Vec<TrackedDetection> {
        self.into_iter()
            .map(|(track_id, [x1, y1, x2, y2])| TrackedDetection::new(track_id, x1, y1, x2, y2))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_into_detections() {
        let pairs: Vec<(TrackId, [f32; 4])> =
            vec![(3, [0.0, 0.0, 10.0, 20.0]), (5, [5.0, 5.0, 7.0, 9.0])];
        let dets = pairs.into_tracked_detections();

        assert_eq!(dets.len(), 2);
        assert_eq!(dets[0].track_id, 3);
        assert_eq!(dets[1].bbox.to_tlbr(), [5.0, 5.0, 7.0, 9.0]);
    }
}
