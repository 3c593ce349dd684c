//! GPU uniform layout of the mirror pass.

use bytemuck::{Pod, Zeroable};
use mirrorplay_shared::{MirrorMode, Rotation};

/// Matches `MirrorUniforms` in `mirror.wgsl` (16 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MirrorUniforms {
    /// Output size in pixels.
    pub resolution: [f32; 2],
    /// [`MirrorMode`] wire value.
    pub mirror_mode: u32,
    /// Sensor rotation in clockwise quarter turns.
    pub quarter_turns: u32,
}

impl MirrorUniforms {
    /// Builds the uniform block.
    #[must_use]
    pub fn new(width: u32, height: u32, mode: MirrorMode, rotation: Rotation) -> Self {
        Self {
            resolution: [width as f32, height as f32],
            mirror_mode: u32::from(mode.as_u8()),
            quarter_turns: rotation.quarter_turns(),
        }
    }
}
