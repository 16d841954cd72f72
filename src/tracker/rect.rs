use serde::{Deserialize, Serialize};

/// Bounding box of a tracked person, stored as top-left corner plus size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left x coordinate
    pub x: f32,
    /// Top-left y coordinate
    pub y: f32,
    /// Width of the bounding box
    pub width: f32,
    /// Height of the bounding box
    pub height: f32,
}

impl Rect {
    /// Create a new Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// Get the center point of the bounding box.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Pixel used for zone membership.
    ///
    /// Corners are truncated to whole pixels first, then the center is
    /// taken with floor division, so the point always lands on a mask cell.
    pub fn reference_point(&self) -> (i64, i64) {
        let [x1, y1, x2, y2] = self.to_tlbr();
        let (x1, y1, x2, y2) = (x1 as i64, y1 as i64, x2 as i64, y2 as i64);
        ((x1 + x2).div_euclid(2), (y1 + y2).div_euclid(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tlbr() {
        let rect = Rect::from_tlbr(10.0, 20.0, 40.0, 60.0);
        assert_eq!(rect, Rect::new(10.0, 20.0, 30.0, 40.0));
        assert_eq!(rect.to_tlbr(), [10.0, 20.0, 40.0, 60.0]);
    }

    #[test]
    fn test_center() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.center(), (25.0, 40.0));
    }

    #[test]
    fn test_reference_point_truncates_corners() {
        // 10.9 -> 10 and 41.7 -> 41, (10 + 41) / 2 = 25
        let rect = Rect::from_tlbr(10.9, 20.2, 41.7, 61.0);
        assert_eq!(rect.reference_point(), (25, 40));
    }

    #[test]
    fn test_reference_point_negative_coordinates() {
        let rect = Rect::from_tlbr(-5.0, -5.0, 2.0, 0.0);
        assert_eq!(rect.reference_point(), (-2, -3));
    }
}
