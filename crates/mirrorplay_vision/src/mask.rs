//! # Segmentation Masks
//!
//! Two representations:
//!
//! - [`SegmentationMask`]: raw per-pixel confidence in `[0, 1]`, as produced
//!   by the model.
//! - [`HitMask`]: the binary result of thresholding, stored one byte per
//!   pixel (`0` background, `255` foreground) so the renderer can upload it
//!   as an R8 texture without another pass.
//!
//! Threshold rule: `confidence >= threshold` is foreground.

use crate::error::{VisionError, VisionResult};

/// Foreground byte value.
pub const FOREGROUND: u8 = 255;
/// Background byte value.
pub const BACKGROUND: u8 = 0;

/// Per-pixel confidence that the pixel belongs to the user.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationMask {
    width: u32,
    height: u32,
    confidence: Vec<f32>,
}

impl SegmentationMask {
    /// Wraps a row-major confidence buffer.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::DimensionMismatch`] if the buffer does not hold
    /// exactly `width * height` values, or if either dimension is zero.
    pub fn new(width: u32, height: u32, confidence: Vec<f32>) -> VisionResult<Self> {
        let expected = width as usize * height as usize;
        if expected == 0 || confidence.len() != expected {
            return Err(VisionError::DimensionMismatch {
                expected,
                actual: confidence.len(),
            });
        }
        Ok(Self { width, height, confidence })
    }

    /// Width in mask pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in mask pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw confidence values, row-major.
    #[must_use]
    pub fn confidence(&self) -> &[f32] {
        &self.confidence
    }
}

/// Binary foreground mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HitMask {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl HitMask {
    /// Thresholds a confidence mask. `NaN` counts as background.
    #[must_use]
    pub fn from_confidence(mask: &SegmentationMask, threshold: f32) -> Self {
        let pixels = mask
            .confidence
            .iter()
            .map(|&c| if c >= threshold { FOREGROUND } else { BACKGROUND })
            .collect();
        Self {
            width: mask.width,
            height: mask.height,
            pixels,
        }
    }

    /// Builds a mask directly from foreground flags.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::DimensionMismatch`] on a size mismatch.
    pub fn from_flags(width: u32, height: u32, flags: &[bool]) -> VisionResult<Self> {
        let expected = width as usize * height as usize;
        if expected == 0 || flags.len() != expected {
            return Err(VisionError::DimensionMismatch {
                expected,
                actual: flags.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels: flags
                .iter()
                .map(|&f| if f { FOREGROUND } else { BACKGROUND })
                .collect(),
        })
    }

    /// Width in mask pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in mask pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major bytes, `0` or `255`.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Whether the mask pixel at `(x, y)` is foreground. Out of range is background.
    #[inline]
    #[must_use]
    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.pixels[y as usize * self.width as usize + x as usize] == FOREGROUND
    }

    /// Maps a point in view space into mask space and reads it.
    ///
    /// Each axis is scaled independently by `mask / view`, truncated, then
    /// clamped to the mask bounds, so points off the view edge read the
    /// nearest edge pixel.
    #[must_use]
    pub fn sample_view(&self, x: f32, y: f32, view_width: f32, view_height: f32) -> bool {
        if view_width <= 0.0 || view_height <= 0.0 {
            return false;
        }
        let scale_x = self.width as f32 / view_width;
        let scale_y = self.height as f32 / view_height;
        let mx = clamp_index(x * scale_x, self.width);
        let my = clamp_index(y * scale_y, self.height);
        self.is_foreground(mx, my)
    }

    /// Foreground pixel counts in the left (`x < width / 2`) and right halves.
    #[must_use]
    pub fn lit_halves(&self) -> (u32, u32) {
        let half = self.width / 2;
        let mut left = 0u32;
        let mut right = 0u32;
        for row in self.pixels.chunks_exact(self.width as usize) {
            for (x, &px) in row.iter().enumerate() {
                if px == FOREGROUND {
                    if (x as u32) < half {
                        left += 1;
                    } else {
                        right += 1;
                    }
                }
            }
        }
        (left, right)
    }
}

fn clamp_index(coord: f32, len: u32) -> u32 {
    if coord.is_nan() || coord <= 0.0 {
        return 0;
    }
    (coord as u32).min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(confidence: f32) -> SegmentationMask {
        SegmentationMask::new(1, 1, vec![confidence]).unwrap()
    }

    #[test]
    fn test_threshold_boundary() {
        assert!(HitMask::from_confidence(&single(0.99), 0.99).is_foreground(0, 0));
        assert!(!HitMask::from_confidence(&single(0.989), 0.99).is_foreground(0, 0));
        assert!(HitMask::from_confidence(&single(0.995), 0.99).is_foreground(0, 0));
        assert!(!HitMask::from_confidence(&single(f32::NAN), 0.99).is_foreground(0, 0));
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(
            SegmentationMask::new(2, 2, vec![0.0; 3]),
            Err(VisionError::DimensionMismatch { expected: 4, actual: 3 })
        );
        assert!(HitMask::from_flags(0, 0, &[]).is_err());
    }

    #[test]
    fn test_view_mapping_scales_and_clamps() {
        // 4x2 mask, only (3, 1) lit; view is 400x200 -> scale 0.01.
        let mut flags = vec![false; 8];
        flags[7] = true;
        let mask = HitMask::from_flags(4, 2, &flags).unwrap();

        assert!(mask.sample_view(350.0, 150.0, 400.0, 200.0));
        assert!(!mask.sample_view(250.0, 150.0, 400.0, 200.0));
        // Beyond the view edge clamps to the last pixel.
        assert!(mask.sample_view(5000.0, 900.0, 400.0, 200.0));
        // Negative coordinates clamp to zero.
        assert!(!mask.sample_view(-40.0, -40.0, 400.0, 200.0));
    }

    #[test]
    fn test_lit_halves() {
        let flags = [true, true, false, true, false, false, false, true];
        let mask = HitMask::from_flags(4, 2, &flags).unwrap();
        assert_eq!(mask.lit_halves(), (2, 2));
        let flags = [true, true, true, false, true, false, false, false];
        let mask = HitMask::from_flags(4, 2, &flags).unwrap();
        assert_eq!(mask.lit_halves(), (3, 1));
    }
}
