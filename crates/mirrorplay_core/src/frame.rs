//! # Raw Camera Frames
//!
//! A [`Frame`] is an immutable, cheaply clonable view of one camera image.
//! The pixel buffer sits behind an `Arc`, so handing the same frame to the
//! bridge and to the segmentation worker costs two reference counts, not two
//! copies.

use std::sync::Arc;
use std::time::Duration;

use mirrorplay_shared::Rotation;

use crate::error::{FrameError, FrameResult};

/// Pixel layout of a frame buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 4 bytes per pixel, R G B A.
    #[default]
    Rgba8,
    /// 3 bytes per pixel, R G B.
    Rgb8,
}

impl PixelFormat {
    /// Bytes used by one pixel.
    #[inline]
    #[must_use]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Rgb8 => 3,
        }
    }
}

/// One raw camera image.
#[derive(Clone, Debug)]
pub struct Frame {
    width: u32,
    height: u32,
    format: PixelFormat,
    rotation: Rotation,
    timestamp: Duration,
    data: Arc<[u8]>,
}

impl Frame {
    /// Wraps a pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ZeroSize`] for an empty image and
    /// [`FrameError::LengthMismatch`] when `data` does not hold exactly
    /// `width * height` pixels of `format`.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: impl Into<Arc<[u8]>>,
    ) -> FrameResult<Self> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroSize { width, height });
        }
        let data = data.into();
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(FrameError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            rotation: Rotation::Deg0,
            timestamp: Duration::ZERO,
            data,
        })
    }

    /// Sets the sensor rotation reported by the source.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the capture timestamp (time since the source started).
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Duration) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Width in pixels, before rotation.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels, before rotation.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout.
    #[inline]
    #[must_use]
    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Sensor rotation.
    #[inline]
    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Capture timestamp.
    #[inline]
    #[must_use]
    pub const fn timestamp(&self) -> Duration {
        self.timestamp
    }

    /// Raw pixel bytes.
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns an RGBA copy of an RGB frame, or a clone of an RGBA one.
    #[must_use]
    pub fn to_rgba8(&self) -> Self {
        match self.format {
            PixelFormat::Rgba8 => self.clone(),
            PixelFormat::Rgb8 => {
                let mut rgba = Vec::with_capacity(self.pixel_count() * 4);
                for px in self.data.chunks_exact(3) {
                    rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
                }
                Self {
                    format: PixelFormat::Rgba8,
                    data: rgba.into(),
                    ..self.clone()
                }
            }
        }
    }

    /// Number of pixels.
    #[inline]
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Rec. 601 luma of the pixel at `(x, y)`; out-of-range coordinates clamp.
    #[must_use]
    pub fn luma_at(&self, x: u32, y: u32) -> u8 {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        let bpp = self.format.bytes_per_pixel();
        let i = (y * self.width as usize + x) * bpp;
        let (r, g, b) = (
            u32::from(self.data[i]),
            u32::from(self.data[i + 1]),
            u32::from(self.data[i + 2]),
        );
        ((r * 299 + g * 587 + b * 114) / 1000) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_size() {
        let err = Frame::new(0, 4, PixelFormat::Rgba8, Vec::new()).unwrap_err();
        assert_eq!(err, FrameError::ZeroSize { width: 0, height: 4 });
    }

    #[test]
    fn test_rejects_short_buffer() {
        let err = Frame::new(2, 2, PixelFormat::Rgb8, vec![0u8; 11]).unwrap_err();
        assert_eq!(err, FrameError::LengthMismatch { expected: 12, actual: 11 });
    }

    #[test]
    fn test_rgb_to_rgba() {
        let frame = Frame::new(2, 1, PixelFormat::Rgb8, vec![1, 2, 3, 4, 5, 6])
            .unwrap()
            .with_rotation(Rotation::Deg90);
        let rgba = frame.to_rgba8();
        assert_eq!(rgba.format(), PixelFormat::Rgba8);
        assert_eq!(rgba.data(), &[1, 2, 3, 255, 4, 5, 6, 255]);
        assert_eq!(rgba.rotation(), Rotation::Deg90);
    }

    #[test]
    fn test_luma_white_and_clamped() {
        let frame = Frame::new(1, 1, PixelFormat::Rgba8, vec![255, 255, 255, 255]).unwrap();
        assert_eq!(frame.luma_at(0, 0), 255);
        assert_eq!(frame.luma_at(9, 9), 255);
    }
}
