//! Single-word settings shared between the UI and render contexts.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use mirrorplay_shared::MirrorMode;

/// Live-tunable render parameters.
///
/// Writes come from the UI thread, reads from the render thread on the next
/// draw. `Relaxed` ordering is enough: each value is independent and a
/// reader seeing the previous value for one frame is harmless.
#[derive(Debug, Default)]
pub struct SharedTunables {
    mirror_mode: AtomicU8,
    segmentation_visible: AtomicBool,
}

impl SharedTunables {
    /// Creates tunables with an initial mirror mode.
    #[must_use]
    pub fn new(mode: MirrorMode) -> Self {
        Self {
            mirror_mode: AtomicU8::new(mode.as_u8()),
            segmentation_visible: AtomicBool::new(false),
        }
    }

    /// Changes the mirror mode. Returns the previous mode.
    pub fn set_mirror_mode(&self, mode: MirrorMode) -> MirrorMode {
        MirrorMode::from_u8(self.mirror_mode.swap(mode.as_u8(), Ordering::Relaxed))
    }

    /// Current mirror mode.
    #[inline]
    #[must_use]
    pub fn mirror_mode(&self) -> MirrorMode {
        MirrorMode::from_u8(self.mirror_mode.load(Ordering::Relaxed))
    }

    /// Shows or hides the segmentation silhouette.
    pub fn set_segmentation_visible(&self, visible: bool) {
        self.segmentation_visible.store(visible, Ordering::Relaxed);
    }

    /// Whether the segmentation silhouette is drawn.
    #[inline]
    #[must_use]
    pub fn segmentation_visible(&self) -> bool {
        self.segmentation_visible.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_mode_swap_returns_previous() {
        let tunables = SharedTunables::new(MirrorMode::MirrorRight);
        assert_eq!(tunables.mirror_mode(), MirrorMode::MirrorRight);
        assert_eq!(tunables.set_mirror_mode(MirrorMode::MirrorLeft), MirrorMode::MirrorRight);
        assert_eq!(tunables.mirror_mode(), MirrorMode::MirrorLeft);
    }

    #[test]
    fn test_segmentation_visibility_defaults_off() {
        let tunables = SharedTunables::default();
        assert_eq!(tunables.mirror_mode(), MirrorMode::Full);
        assert!(!tunables.segmentation_visible());
        tunables.set_segmentation_visible(true);
        assert!(tunables.segmentation_visible());
    }
}
