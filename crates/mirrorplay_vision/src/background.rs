//! # Background-Difference Segmenter
//!
//! A stand-in for a real body-segmentation model on machines without one.
//!
//! 1. The first `learn_frames` frames are sampled (luma, every `stride`-th
//!    pixel) and reduced to a per-pixel median: the empty scene.
//! 2. Afterwards each frame's luma is compared to that background; the
//!    absolute difference divided by [`FULL_SCALE`] (capped at 1.0) is the
//!    confidence.
//!
//! The user should step out of view while the background is learned.

use mirrorplay_core::Frame;

use crate::engine::SegmentationEngine;
use crate::error::{VisionError, VisionResult};
use crate::mask::SegmentationMask;

/// Luma difference that maps to full confidence.
pub const FULL_SCALE: f32 = 48.0;

/// Median-background segmenter.
#[derive(Clone, Debug)]
pub struct BackgroundDiffSegmenter {
    learn_frames: usize,
    stride: u32,
    grid: Option<(u32, u32)>,
    samples: Vec<Vec<u8>>,
    background: Option<Vec<u8>>,
}

impl Default for BackgroundDiffSegmenter {
    fn default() -> Self {
        Self::new(30, 4)
    }
}

impl BackgroundDiffSegmenter {
    /// Creates a segmenter learning from `learn_frames` frames (at least 1),
    /// sampling every `stride`-th pixel (at least 1) on both axes.
    #[must_use]
    pub fn new(learn_frames: usize, stride: u32) -> Self {
        Self {
            learn_frames: learn_frames.max(1),
            stride: stride.max(1),
            grid: None,
            samples: Vec::new(),
            background: None,
        }
    }

    /// Whether the background has been learned.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.background.is_some()
    }

    /// Forgets the background and starts learning again.
    pub fn reset(&mut self) {
        self.grid = None;
        self.samples.clear();
        self.background = None;
    }

    fn sample(&self, frame: &Frame) -> (u32, u32, Vec<u8>) {
        let gw = frame.width().div_ceil(self.stride);
        let gh = frame.height().div_ceil(self.stride);
        let mut luma = Vec::with_capacity(gw as usize * gh as usize);
        for gy in 0..gh {
            for gx in 0..gw {
                luma.push(frame.luma_at(gx * self.stride, gy * self.stride));
            }
        }
        (gw, gh, luma)
    }

    fn learn_median(&mut self) {
        let len = self.samples.first().map_or(0, Vec::len);
        let mut column = vec![0u8; self.samples.len()];
        let mut background = Vec::with_capacity(len);
        for i in 0..len {
            for (slot, sample) in column.iter_mut().zip(&self.samples) {
                *slot = sample[i];
            }
            column.sort_unstable();
            background.push(column[column.len() / 2]);
        }
        self.samples.clear();
        self.background = Some(background);
        tracing::info!("Background model learned ({} frames)", self.learn_frames);
    }
}

impl SegmentationEngine for BackgroundDiffSegmenter {
    fn analyze(&mut self, frame: &Frame) -> VisionResult<SegmentationMask> {
        let (gw, gh, luma) = self.sample(frame);
        if self.grid != Some((gw, gh)) {
            if self.grid.is_some() {
                tracing::debug!("Frame size changed, relearning background");
            }
            self.reset();
            self.grid = Some((gw, gh));
        }

        let Some(background) = &self.background else {
            self.samples.push(luma);
            if self.samples.len() < self.learn_frames {
                return Err(VisionError::NotReady {
                    collected: self.samples.len(),
                    required: self.learn_frames,
                });
            }
            self.learn_median();
            return Err(VisionError::NotReady {
                collected: self.learn_frames,
                required: self.learn_frames,
            });
        };

        let confidence = luma
            .iter()
            .zip(background)
            .map(|(&l, &b)| (f32::from(l.abs_diff(b)) / FULL_SCALE).min(1.0))
            .collect();
        SegmentationMask::new(gw, gh, confidence)
    }
}
