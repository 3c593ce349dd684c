//! # MIRRORPLAY Vision
//!
//! Turns camera frames into binary body masks without ever blocking the
//! game loop.
//!
//! ```text
//!  camera ──► SegmentationWorker::submit ──► [bounded(1), evict-oldest]
//!                                                   │
//!                                           worker thread
//!                                     SegmentationEngine::analyze
//!                                     HitMask::from_confidence
//!                                                   │
//!  game loop ◄── SegmentationWorker::drain_latest ◄─┘
//! ```
//!
//! The model itself is an external collaborator behind
//! [`SegmentationEngine`]; this crate owns the threading, the threshold
//! conversion and the mask-space lookups.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod background;
pub mod engine;
pub mod error;
pub mod mask;
pub mod orientation;
pub mod worker;

pub use background::BackgroundDiffSegmenter;
pub use engine::SegmentationEngine;
pub use error::{VisionError, VisionResult};
pub use mask::{HitMask, SegmentationMask};
pub use orientation::{decide_mirror_mode, AutoOrientation};
pub use worker::{AnalysisOutcome, SegmentationWorker, WorkerStats};
