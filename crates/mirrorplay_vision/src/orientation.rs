//! # Auto Orientation
//!
//! Picks the mirror source half from where the user's body is. Someone
//! whose silhouette fills the left half is exercising with their left side,
//! so the left half becomes the source (`MirrorLeft`).

use std::time::Duration;

use mirrorplay_shared::{AutoOrientationConfig, MirrorMode};

use crate::mask::HitMask;

/// Chooses a mirror mode from a mask.
///
/// Below `min_lit_pixels` foreground pixels, or on a tie, `current` is kept.
#[must_use]
pub fn decide_mirror_mode(mask: &HitMask, min_lit_pixels: u32, current: MirrorMode) -> MirrorMode {
    let (left, right) = mask.lit_halves();
    if left.saturating_add(right) < min_lit_pixels {
        return current;
    }
    match left.cmp(&right) {
        std::cmp::Ordering::Greater => MirrorMode::MirrorLeft,
        std::cmp::Ordering::Less => MirrorMode::MirrorRight,
        std::cmp::Ordering::Equal => current,
    }
}

/// Periodic driver around [`decide_mirror_mode`].
#[derive(Clone, Debug)]
pub struct AutoOrientation {
    period: Duration,
    min_lit_pixels: u32,
    since_last: Duration,
}

impl AutoOrientation {
    /// Creates a driver from configuration.
    #[must_use]
    pub fn new(config: &AutoOrientationConfig) -> Self {
        Self {
            period: config.period(),
            min_lit_pixels: config.min_lit_pixels,
            since_last: Duration::ZERO,
        }
    }

    /// Advances by `dt`. Once per period, analyses `mask` and returns the new
    /// mode if it differs from `current`.
    pub fn update(
        &mut self,
        dt: Duration,
        mask: Option<&HitMask>,
        current: MirrorMode,
    ) -> Option<MirrorMode> {
        self.since_last += dt;
        if self.since_last < self.period {
            return None;
        }
        self.since_last = Duration::ZERO;
        let decided = decide_mirror_mode(mask?, self.min_lit_pixels, current);
        (decided != current).then_some(decided)
    }
}
