//! Replay of tracker output recorded as JSON lines.
//!
//! One frame per line:
//!
//! ```json
//! {"timestamp": "2024-03-01T09:00:00Z", "detections": [{"track_id": 7, "bbox": [10, 20, 50, 80]}]}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::tracker::TrackId;

use super::{IntoTrackedDetections, TrackSource, TrackedFrame};

/// Error type for replay failures.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read detections: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: timestamp {timestamp} is earlier than previous frame {previous}")]
    OutOfOrder {
        line: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },
}

#[derive(Debug, Deserialize)]
struct FrameLine {
    timestamp: DateTime<Utc>,
    #[serde(default)]
    detections: Vec<DetectionLine>,
}

#[derive(Debug, Deserialize)]
struct DetectionLine {
    track_id: TrackId,
    /// x1, y1, x2, y2
    bbox: [f32; 4],
}

/// [`TrackSource`] reading frames from a JSON-lines log.
pub struct JsonLinesSource<B> {
    lines: Lines<B>,
    line_no: usize,
    previous: Option<DateTime<Utc>>,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<B: BufRead> JsonLinesSource<B> {
    pub fn new(reader: B) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            previous: None,
        }
    }
}

impl<B: BufRead> TrackSource for JsonLinesSource<B> {
    type Error = SourceError;

    fn next_frame(&mut self) -> Result<Option<TrackedFrame>, Self::Error> {
        for line in self.lines.by_ref() {
            let line = line?;
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }

            let frame: FrameLine =
                serde_json::from_str(&line).map_err(|source| SourceError::Parse {
                    line: self.line_no,
                    source,
                })?;

            if let Some(previous) = self.previous {
                if frame.timestamp < previous {
                    return Err(SourceError::OutOfOrder {
                        line: self.line_no,
                        timestamp: frame.timestamp,
                        previous,
                    });
                }
            }
            self.previous = Some(frame.timestamp);

            let detections = frame
                .detections
                .into_iter()
                .map(|d| (d.track_id, d.bbox))
                .collect::<Vec<_>>()
                .into_tracked_detections();

            return Ok(Some(TrackedFrame {
                timestamp: frame.timestamp,
                detections,
            }));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_frames_and_skips_blank_lines() {
        let log = r#"{"timestamp": "2024-03-01T09:00:00Z", "detections": [{"track_id": 7, "bbox": [10, 20, 50, 80]}]}

{"timestamp": "2024-03-01T09:00:01Z"}
"#;
        let mut source = JsonLinesSource::new(Cursor::new(log));

        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.detections.len(), 1);
        assert_eq!(first.detections[0].track_id, 7);
        assert_eq!(first.detections[0].bbox.reference_point(), (30, 50));

        let second = source.next_frame().unwrap().unwrap();
        assert!(second.detections.is_empty());
        assert!(second.timestamp > first.timestamp);

        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_parse_error_reports_line() {
        let log = "{\"timestamp\": \"2024-03-01T09:00:00Z\"}\nnot json\n";
        let mut source = JsonLinesSource::new(Cursor::new(log));
        source.next_frame().unwrap();

        let err = source.next_frame().unwrap_err();
        assert!(matches!(err, SourceError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_rejects_time_going_backwards() {
        let log = "{\"timestamp\": \"2024-03-01T09:00:05Z\"}\n{\"timestamp\": \"2024-03-01T09:00:01Z\"}\n";
        let mut source = JsonLinesSource::new(Cursor::new(log));
        source.next_frame().unwrap();

        let err = source.next_frame().unwrap_err();
        assert!(matches!(err, SourceError::OutOfOrder { line: 2, .. }));
    }
}
