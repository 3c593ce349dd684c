//! # Mirror Sampling Test
//!
//! Runs the CPU reference of the mirror shader over a synthetic camera
//! frame whose columns are all different, so every read is attributable to
//! one source column.

use mirrorplay_core::{Frame, PixelFormat};
use mirrorplay_rendering::mirror::sampling::shade;
use mirrorplay_shared::{MirrorMode, Rotation};

const FINE: [f32; 2] = [1000.0, 1000.0];

/// 8x2 frame; column `c` has gray level `c * 30`.
fn columns() -> Frame {
    let mut data = Vec::with_capacity(8 * 2 * 4);
    for _row in 0..2 {
        for col in 0..8u8 {
            let v = col * 30;
            data.extend_from_slice(&[v, v, v, 255]);
        }
    }
    Frame::new(8, 2, PixelFormat::Rgba8, data).unwrap()
}

fn column_center(col: u32) -> f32 {
    (col as f32 + 0.5) / 8.0
}

#[test]
fn test_full_mode_reads_own_column() {
    let frame = columns();
    for col in 0..8 {
        let px = shade(&frame, [column_center(col), 0.5], MirrorMode::Full, FINE);
        assert_eq!(px[0], (col * 30) as u8);
    }
}

#[test]
fn test_mirror_left_right_half_reflects_left() {
    let frame = columns();
    for col in 4..8 {
        let mirrored = shade(&frame, [column_center(col), 0.5], MirrorMode::MirrorLeft, FINE);
        let source = shade(&frame, [column_center(7 - col), 0.5], MirrorMode::MirrorLeft, FINE);
        assert_eq!(mirrored, source, "column {col} must show column {}", 7 - col);
    }
}

#[test]
fn test_mirror_right_left_half_reflects_right() {
    let frame = columns();
    let px = shade(&frame, [column_center(0), 0.5], MirrorMode::MirrorRight, FINE);
    assert_eq!(px[0], 7 * 30);
    let px = shade(&frame, [column_center(6), 0.5], MirrorMode::MirrorRight, FINE);
    assert_eq!(px[0], 6 * 30);
}

#[test]
fn test_rotated_sensor_is_read_upside_down() {
    let frame = columns().with_rotation(Rotation::Deg180);
    let px = shade(&frame, [column_center(0), 0.25], MirrorMode::Full, FINE);
    assert_eq!(px[0], 7 * 30);
}

#[test]
fn test_box_filter_averages_across_edge() {
    // A coarse output resolution spreads the taps over two columns.
    let frame = columns();
    let px = shade(&frame, [0.25, 0.5], MirrorMode::Full, [16.0, 1000.0]);
    // Taps at 0.1875 (column 1) and 0.3125 (column 2).
    assert_eq!(px[0], 45);
}
