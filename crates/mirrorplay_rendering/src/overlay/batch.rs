//! CPU-side instance list for the overlay pass.

use bytemuck::{Pod, Zeroable};
use mirrorplay_shared::{BallColor, Vec2};

/// Darkening applied to a ball's rim.
const RIM_FACTOR: f32 = 0.7;

/// Popup tints, indexed by success cue.
const CUE_TINTS: [[f32; 4]; 4] = [
    [1.0, 0.55, 0.0, 0.9],
    [0.3, 0.85, 1.0, 0.9],
    [0.45, 1.0, 0.35, 0.9],
    [1.0, 0.3, 0.75, 0.9],
];

/// Instance shape selector, matches `shape` in `overlay.wgsl`.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// Anti-aliased disc with radial gradient.
    Circle = 0,
    /// Flat-colored rectangle.
    Quad = 1,
}

/// One overlay instance (64 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct OverlayInstance {
    /// Center in view pixels.
    pub center: [f32; 2],
    /// Half extent in view pixels.
    pub half_size: [f32; 2],
    /// Center color (circles) or fill (quads), linear RGBA.
    pub inner: [f32; 4],
    /// Edge color of circles.
    pub rim: [f32; 4],
    /// [`Shape`] discriminant.
    pub shape: u32,
    /// Padding to a 16-byte multiple.
    pub _pad: [u32; 3],
}

/// Instances for one overlay frame.
#[derive(Clone, Debug, Default)]
pub struct OverlayBatch {
    instances: Vec<OverlayInstance>,
}

impl OverlayBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the batch, keeping its allocation.
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    /// Adds a ball. A ball whose pop animation has shrunk it to nothing is skipped.
    pub fn push_ball(&mut self, center: Vec2, radius: f32, color: BallColor, scale: f32) {
        let r = radius * scale;
        if r <= 0.0 {
            return;
        }
        let rim = color.darkened(RIM_FACTOR);
        self.instances.push(OverlayInstance {
            center: center.to_array(),
            half_size: [r, r],
            inner: color.rgba_f32(),
            rim: [
                f32::from(rim[0]) / 255.0,
                f32::from(rim[1]) / 255.0,
                f32::from(rim[2]) / 255.0,
                1.0,
            ],
            shape: Shape::Circle as u32,
            _pad: [0; 3],
        });
    }

    /// Adds a popup with its top-left corner at `origin`.
    pub fn push_popup(&mut self, origin: Vec2, size: (f32, f32), cue_index: usize) {
        let tint = CUE_TINTS[cue_index % CUE_TINTS.len()];
        self.push_quad(origin, size, tint);
    }

    /// Adds a flat rectangle with its top-left corner at `origin`.
    pub fn push_quad(&mut self, origin: Vec2, size: (f32, f32), color: [f32; 4]) {
        let half = [size.0 * 0.5, size.1 * 0.5];
        self.instances.push(OverlayInstance {
            center: [origin.x + half[0], origin.y + half[1]],
            half_size: half,
            inner: color,
            rim: color,
            shape: Shape::Quad as u32,
            _pad: [0; 3],
        });
    }

    /// Instances in draw order.
    #[must_use]
    pub fn instances(&self) -> &[OverlayInstance] {
        &self.instances
    }

    /// Number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether the batch has nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
