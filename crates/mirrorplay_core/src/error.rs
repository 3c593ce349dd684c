//! # Frame Error Types

use thiserror::Error;

/// Errors raised when a raw camera buffer cannot be wrapped as a [`Frame`](crate::Frame).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Width or height is zero.
    #[error("frame has zero size ({width}x{height})")]
    ZeroSize {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },

    /// The buffer length does not match `width * height * bytes_per_pixel`.
    #[error("frame buffer length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch {
        /// Required byte count.
        expected: usize,
        /// Provided byte count.
        actual: usize,
    },
}

/// Result type for frame operations.
pub type FrameResult<T> = Result<T, FrameError>;
