//! Binary zone masks loaded from grayscale images.

use std::path::{Path, PathBuf};

use image::GrayImage;
use image::imageops::{self, FilterType};
use ndarray::Array2;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ZoneConfig;
use crate::tracker::zone::{Zone, ZonePredicate};

/// Error type for zone mask loading failures.
#[derive(Debug, Error)]
pub enum ZoneMaskError {
    #[error("failed to load zone mask {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid mask size {width}x{height}")]
    EmptySize { width: u32, height: u32 },
    #[error("mask pixels do not match their shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// A fixed-size binary mask; any non-zero pixel belongs to the zone.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneMask {
    /// Pixels indexed as `[[y, x]]`
    pixels: Array2<u8>,
}

impl ZoneMask {
    pub fn from_array(pixels: Array2<u8>) -> Self {
        Self { pixels }
    }

    pub fn from_gray(image: GrayImage) -> Result<Self, ZoneMaskError> {
        let (width, height) = image.dimensions();
        let pixels =
            Array2::from_shape_vec((height as usize, width as usize), image.into_raw())?;
        Ok(Self { pixels })
    }

    /// Load a grayscale mask and resize it to the frame resolution.
    pub fn load(path: impl AsRef<Path>, width: u32, height: u32) -> Result<Self, ZoneMaskError> {
        if width == 0 || height == 0 {
            return Err(ZoneMaskError::EmptySize { width, height });
        }

        let path = path.as_ref();
        let gray = image::open(path)
            .map_err(|source| ZoneMaskError::Load {
                path: path.to_path_buf(),
                source,
            })?
            .to_luma8();

        let gray = if gray.dimensions() == (width, height) {
            gray
        } else {
            debug!(
                path = %path.display(),
                from = ?gray.dimensions(),
                to = ?(width, height),
                "resizing zone mask"
            );
            imageops::resize(&gray, width, height, FilterType::Nearest)
        };

        Self::from_gray(gray)
    }

    pub fn width(&self) -> usize {
        self.pixels.ncols()
    }

    pub fn height(&self) -> usize {
        self.pixels.nrows()
    }

    /// Whether `(x, y)` lies on a set pixel. Out of bounds is always `false`.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.pixels
            .get([y as usize, x as usize])
            .is_some_and(|&p| p > 0)
    }
}

/// The waiting, serving and staff masks of one camera view.
///
/// A zone without a mask is absent and never contains any point.
#[derive(Debug, Clone, Default)]
pub struct ZoneMasks {
    waiting: Option<ZoneMask>,
    serving: Option<ZoneMask>,
    staff: Option<ZoneMask>,
}

impl ZoneMasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mask(mut self, zone: Zone, mask: ZoneMask) -> Self {
        *self.slot_mut(zone) = Some(mask);
        self
    }

    /// Load every configured mask, resized to `width` x `height`.
    ///
    /// A mask that cannot be loaded is logged and left absent.
    pub fn from_config(config: &ZoneConfig, width: u32, height: u32) -> Self {
        let mut masks = Self::new();
        for zone in Zone::ALL {
            let Some(path) = config.path(zone) else {
                debug!(%zone, "no mask configured");
                continue;
            };
            match ZoneMask::load(path, width, height) {
                Ok(mask) => *masks.slot_mut(zone) = Some(mask),
                Err(err) => warn!(%zone, error = %err, "zone mask unavailable, zone disabled"),
            }
        }
        masks
    }

    pub fn mask(&self, zone: Zone) -> Option<&ZoneMask> {
        match zone {
            Zone::Waiting => self.waiting.as_ref(),
            Zone::Serving => self.serving.as_ref(),
            Zone::Staff => self.staff.as_ref(),
        }
    }

    fn slot_mut(&mut self, zone: Zone) -> &mut Option<ZoneMask> {
        match zone {
            Zone::Waiting => &mut self.waiting,
            Zone::Serving => &mut self.serving,
            Zone::Staff => &mut self.staff,
        }
    }
}

impl ZonePredicate for ZoneMasks {
    fn is_inside(&self, zone: Zone, x: i64, y: i64) -> bool {
        self.mask(zone).is_some_and(|mask| mask.contains(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use ndarray::s;

    fn square_mask() -> ZoneMask {
        let mut pixels = Array2::<u8>::zeros((10, 20));
        pixels.slice_mut(s![2..5, 4..8]).fill(255);
        ZoneMask::from_array(pixels)
    }

    #[test]
    fn test_contains() {
        let mask = square_mask();
        assert_eq!((mask.width(), mask.height()), (20, 10));
        assert!(mask.contains(4, 2));
        assert!(mask.contains(7, 4));
        assert!(!mask.contains(8, 4));
        assert!(!mask.contains(0, 0));
    }

    #[test]
    fn test_out_of_bounds_is_outside() {
        let mask = square_mask();
        assert!(!mask.contains(-1, 3));
        assert!(!mask.contains(5, -1));
        assert!(!mask.contains(20, 3));
        assert!(!mask.contains(5, 10));
    }

    #[test]
    fn test_absent_zone_is_never_inside() {
        let masks = ZoneMasks::new().with_mask(Zone::Waiting, square_mask());
        assert!(masks.is_inside(Zone::Waiting, 5, 3));
        assert!(!masks.is_inside(Zone::Serving, 5, 3));
        assert!(!masks.is_inside(Zone::Staff, 5, 3));
    }

    #[test]
    fn test_load_resizes_to_frame() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waiting.png");

        // left half set
        let img = GrayImage::from_fn(4, 2, |x, _| if x < 2 { Luma([255]) } else { Luma([0]) });
        img.save(&path).unwrap();

        let mask = ZoneMask::load(&path, 8, 4).unwrap();
        assert_eq!((mask.width(), mask.height()), (8, 4));
        assert!(mask.contains(0, 0));
        assert!(mask.contains(3, 3));
        assert!(!mask.contains(4, 0));
        assert!(!mask.contains(7, 3));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ZoneMask::load("does/not/exist.jpg", 8, 4).unwrap_err();
        assert!(matches!(err, ZoneMaskError::Load { .. }));
    }

    #[test]
    fn test_load_zero_size() {
        let err = ZoneMask::load("unused.jpg", 0, 4).unwrap_err();
        assert!(matches!(err, ZoneMaskError::EmptySize { .. }));
    }

    #[test]
    fn test_from_config_skips_missing_masks() {
        let dir = tempfile::tempdir().unwrap();
        let serving = dir.path().join("service.png");
        GrayImage::from_pixel(4, 4, Luma([255])).save(&serving).unwrap();

        let config = ZoneConfig {
            waiting: Some(dir.path().join("missing.jpg")),
            serving: Some(serving),
            staff: None,
        };
        let masks = ZoneMasks::from_config(&config, 4, 4);

        assert!(masks.mask(Zone::Waiting).is_none());
        assert!(masks.mask(Zone::Staff).is_none());
        assert!(masks.is_inside(Zone::Serving, 2, 2));
        assert!(!masks.is_inside(Zone::Waiting, 2, 2));
    }
}
