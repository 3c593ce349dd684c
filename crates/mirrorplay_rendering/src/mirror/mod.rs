//! # Mirror Pass
//!
//! Full-screen pass that samples the camera texture through the mirror
//! remap:
//!
//! ```text
//!  Full          MirrorLeft          MirrorRight
//!  ┌─────┬─────┐ ┌─────┬─────┐       ┌─────┬─────┐
//!  │  L  │  R  │ │  L  │ ⅃   │       │  Я  │  R  │
//!  └─────┴─────┘ └─────┴─────┘       └─────┴─────┘
//! ```

mod renderer;
pub mod sampling;
mod uniforms;

pub use renderer::MirrorRenderer;
pub use uniforms::MirrorUniforms;

/// WGSL source of the mirror pass.
pub const MIRROR_SHADER: &str = include_str!("mirror.wgsl");
