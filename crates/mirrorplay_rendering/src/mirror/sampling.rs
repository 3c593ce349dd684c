//! CPU reference of the mirror shader.
//!
//! Same math as `mirror.wgsl`, step for step, with nearest-texel lookups in
//! place of the hardware sampler. Used by tests and by anything that needs
//! to know where a display point reads from.

use mirrorplay_core::Frame;
use mirrorplay_shared::{MirrorMode, Rotation};

/// Horizontal remap applied before the texture lookup.
#[inline]
#[must_use]
pub fn remap_u(x: f32, mode: MirrorMode) -> f32 {
    match mode {
        MirrorMode::MirrorLeft if x > 0.5 => (1.0 - (x - 0.5) * 2.0) * 0.5,
        MirrorMode::MirrorRight if x < 0.5 => 0.5 + (1.0 - x * 2.0) * 0.5,
        _ => x,
    }
}

/// Maps display coordinates to sensor coordinates for a rotated sensor.
#[inline]
#[must_use]
pub fn rotate_uv(uv: [f32; 2], rotation: Rotation) -> [f32; 2] {
    let [x, y] = uv;
    match rotation.quarter_turns() {
        1 => [y, 1.0 - x],
        2 => [1.0 - x, 1.0 - y],
        3 => [1.0 - y, x],
        _ => [x, y],
    }
}

/// The four box-filter tap positions around `st`, one output pixel apart.
#[must_use]
pub fn box_taps(st: [f32; 2], resolution: [f32; 2]) -> [[f32; 2]; 4] {
    let dx = 1.0 / resolution[0].max(1.0);
    let dy = 1.0 / resolution[1].max(1.0);
    [
        [st[0] - dx, st[1] - dy],
        [st[0] + dx, st[1] - dy],
        [st[0] - dx, st[1] + dy],
        [st[0] + dx, st[1] + dy],
    ]
}

/// Sensor coordinate sampled for display coordinate `uv`, before filtering.
#[must_use]
pub fn source_uv(uv: [f32; 2], mode: MirrorMode, rotation: Rotation) -> [f32; 2] {
    rotate_uv([remap_u(uv[0], mode), uv[1]], rotation)
}

/// Shades one output pixel the way the fragment shader does, using
/// clamp-to-edge nearest sampling.
#[must_use]
pub fn shade(
    frame: &Frame,
    uv: [f32; 2],
    mode: MirrorMode,
    resolution: [f32; 2],
) -> [u8; 4] {
    let st = source_uv(uv, mode, frame.rotation());
    let mut sum = [0u32; 3];
    for tap in box_taps(st, resolution) {
        let px = texel(frame, tap);
        for (acc, c) in sum.iter_mut().zip(px) {
            *acc += u32::from(c);
        }
    }
    [
        ((sum[0] + 2) / 4) as u8,
        ((sum[1] + 2) / 4) as u8,
        ((sum[2] + 2) / 4) as u8,
        255,
    ]
}

fn texel(frame: &Frame, st: [f32; 2]) -> [u8; 3] {
    let w = frame.width();
    let h = frame.height();
    let x = ((st[0].clamp(0.0, 1.0) * w as f32) as u32).min(w - 1) as usize;
    let y = ((st[1].clamp(0.0, 1.0) * h as f32) as u32).min(h - 1) as usize;
    let bpp = frame.format().bytes_per_pixel();
    let i = (y * w as usize + x) * bpp;
    let d = frame.data();
    [d[i], d[i + 1], d[i + 2]]
}
