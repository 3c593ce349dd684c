//! Segmentation engine contract.

use mirrorplay_core::Frame;

use crate::error::VisionResult;
use crate::mask::SegmentationMask;

/// A body-segmentation model.
///
/// Implementations run on the worker thread, one frame at a time, so they
/// may keep internal state without synchronisation. An `Err` means "no mask
/// for this frame"; the caller logs it and moves on.
pub trait SegmentationEngine: Send {
    /// Produces a confidence mask for `frame`.
    ///
    /// # Errors
    ///
    /// Any failure; it is treated as an absent mask.
    fn analyze(&mut self, frame: &Frame) -> VisionResult<SegmentationMask>;
}

impl<F> SegmentationEngine for F
where
    F: FnMut(&Frame) -> VisionResult<SegmentationMask> + Send,
{
    fn analyze(&mut self, frame: &Frame) -> VisionResult<SegmentationMask> {
        self(frame)
    }
}
