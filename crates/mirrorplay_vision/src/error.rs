//! # Vision Error Types

use thiserror::Error;

/// Errors raised by segmentation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VisionError {
    /// The engine could not analyse the frame.
    #[error("segmentation failed: {0}")]
    Analysis(String),

    /// A confidence buffer does not match its declared size.
    #[error("mask size mismatch: expected {expected} values, got {actual}")]
    DimensionMismatch {
        /// `width * height`.
        expected: usize,
        /// Provided length.
        actual: usize,
    },

    /// The engine is still collecting its background model.
    #[error("background model not ready ({collected}/{required} frames)")]
    NotReady {
        /// Frames collected so far.
        collected: usize,
        /// Frames needed.
        required: usize,
    },

    /// The worker thread could not be started.
    #[error("failed to start segmentation worker: {0}")]
    Spawn(String),

    /// The worker thread has stopped.
    #[error("segmentation worker disconnected")]
    Disconnected,
}

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;
