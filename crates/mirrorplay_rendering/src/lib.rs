//! # MIRRORPLAY Rendering
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       ONE DISPLAY FRAME                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  FrameBridge ──take──► FrameTexture (upload, keep last good) │
//! │                              │                               │
//! │  SharedTunables ──mode──► MirrorRenderer (remap + 2x2 box)   │
//! │                              │                               │
//! │  HitMask + OverlayBatch ──► OverlayRenderer (alpha blend)    │
//! │                              │                               │
//! │                          present                             │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The shader math is mirrored on the CPU in [`mirror::sampling`] so it can
//! be tested without a GPU.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod context;
pub mod error;
pub mod mirror;
pub mod overlay;
pub mod texture;

pub use context::GpuContext;
pub use error::{RenderError, RenderResult};
pub use mirror::{MirrorRenderer, MirrorUniforms};
pub use overlay::{OverlayBatch, OverlayInstance, OverlayRenderer};
pub use texture::{FrameTexture, SyncOutcome};
