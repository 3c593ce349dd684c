//! # Game Overlay
//!
//! Everything drawn above the mirror feed, rebuilt every frame from a
//! snapshot of the game state:
//!
//! - the segmentation silhouette (optional, translucent white)
//! - balls: instanced circles with a radial gradient to a darkened rim
//! - popups: tinted quads, one tint per success cue

mod batch;
mod renderer;

pub use batch::{OverlayBatch, OverlayInstance, Shape};
pub use renderer::OverlayRenderer;

/// WGSL source of the overlay passes.
pub const OVERLAY_SHADER: &str = include_str!("overlay.wgsl");
