//! Success popups.

use std::time::Duration;

use rand::Rng;

use mirrorplay_shared::constants::SUCCESS_CUES;
use mirrorplay_shared::Vec2;

/// A success image shown beside the play area for a short while.
#[derive(Clone, Debug, PartialEq)]
pub struct PopupImage {
    /// Index into the success cue set (terrific, wow, great, amazing).
    pub cue: usize,
    /// Top-left corner in view coordinates.
    pub origin: Vec2,
    /// Width and height in view pixels.
    pub size: (f32, f32),
    /// Time left on screen.
    pub remaining: Duration,
}

impl PopupImage {
    /// Name of the cue image.
    #[must_use]
    pub fn cue_name(&self) -> &'static str {
        SUCCESS_CUES[self.cue % SUCCESS_CUES.len()]
    }

    /// Counts down by `dt`. Returns true when the popup should be removed.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        self.remaining.is_zero()
    }
}

/// Picks a popup origin in the left or the right third of the view.
///
/// The middle third stays clear for the balls. Ranges that collapse because
/// the popup is wider than a third pin to the range start.
pub fn place_popup<R: Rng + ?Sized>(rng: &mut R, view: (f32, f32), size: (f32, f32)) -> Vec2 {
    let (width, height) = view;
    let third = width / 3.0;
    let (lo, hi) = if rng.gen_bool(0.5) {
        (0.0, third - size.0)
    } else {
        (2.0 * third, width - size.0)
    };
    Vec2::new(uniform_or_start(rng, lo, hi), uniform_or_start(rng, 0.0, height - size.1))
}

fn uniform_or_start<R: Rng + ?Sized>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_popup_counts_down_to_removal() {
        let mut popup = PopupImage {
            cue: 1,
            origin: Vec2::ZERO,
            size: (240.0, 120.0),
            remaining: Duration::from_millis(1000),
        };
        assert_eq!(popup.cue_name(), "wow");
        for _ in 0..62 {
            assert!(!popup.tick(Duration::from_millis(16)));
        }
        // 63 * 16 = 1008 ms
        assert!(popup.tick(Duration::from_millis(16)));
    }

    #[test]
    fn test_placement_avoids_middle_third() {
        let mut rng = StdRng::seed_from_u64(11);
        let (mut left, mut right) = (0, 0);
        for _ in 0..500 {
            let origin = place_popup(&mut rng, (1080.0, 1920.0), (240.0, 120.0));
            assert!(origin.y >= 0.0 && origin.y < 1800.0);
            if origin.x < 360.0 {
                assert!(origin.x < 120.0);
                left += 1;
            } else {
                assert!(origin.x >= 720.0 && origin.x < 840.0);
                right += 1;
            }
        }
        assert!(left > 0 && right > 0);
    }

    #[test]
    fn test_degenerate_range_pins_to_start() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            let origin = place_popup(&mut rng, (300.0, 100.0), (240.0, 120.0));
            assert!(origin.x == 0.0 || origin.x == 200.0);
            assert_eq!(origin.y, 0.0);
        }
    }
}
