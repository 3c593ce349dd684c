//! # Spawn Policy
//!
//! Decides color, position and speed of every new ball.
//!
//! ```text
//!            center
//!   ┌──────────┼──────────┐
//!   │     ●    │    ○     │   MirrorLeft, offset > 0
//!   │     ▲    │    ▲     │   ● interactive at center - offset
//!   │ interactive  twin   │   ○ twin at 2 * center - x
//!   └──────────┴──────────┘
//! ```
//!
//! Color draws are uniform over the palette, with a frequency floor: if the
//! target color would fall below `1 / floor_denominator` of the balls spawned
//! this stage, the draw is overridden with the target.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mirrorplay_shared::{BallColor, DifficultyParams, MirrorMode, Vec2};

use super::ball::{Ball, BallId, PairId};

/// Result of one spawn decision.
#[derive(Clone, Debug)]
pub struct Spawned {
    /// The ball the user can touch.
    pub interactive: Ball,
    /// Visual twin on the reflected side, when an offset is active.
    pub twin: Option<Ball>,
}

/// Placement parameters read at spawn time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnLayout {
    /// View width in pixels.
    pub view_width: f32,
    /// Current mirror mode.
    pub mirror_mode: MirrorMode,
    /// Distance of the interactive ball from the center line.
    pub target_offset: f32,
}

impl SpawnLayout {
    /// X of the interactive ball.
    #[must_use]
    pub fn interactive_x(&self) -> f32 {
        self.center() + self.mirror_mode.signed_offset(self.target_offset)
    }

    /// X of the twin, if one is spawned.
    #[must_use]
    pub fn twin_x(&self) -> Option<f32> {
        self.has_twin().then(|| 2.0 * self.center() - self.interactive_x())
    }

    fn center(&self) -> f32 {
        self.view_width / 2.0
    }

    fn has_twin(&self) -> bool {
        self.target_offset > 0.0 && self.mirror_mode != MirrorMode::Full
    }
}

/// Seeded spawn policy.
pub struct SpawnPolicy {
    rng: StdRng,
    params: DifficultyParams,
    radius: f32,
    floor_denominator: u32,
    target: Option<BallColor>,
    spawned: u32,
    target_spawned: u32,
    next_ball: u64,
    next_pair: u32,
}

impl SpawnPolicy {
    /// Creates a policy.
    #[must_use]
    pub fn new(seed: u64, params: DifficultyParams, radius: f32, floor_denominator: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            params,
            radius,
            floor_denominator: floor_denominator.max(1),
            target: None,
            spawned: 0,
            target_spawned: 0,
            next_ball: 0,
            next_pair: 0,
        }
    }

    /// Sets the stage target and resets the frequency counters.
    pub fn set_target(&mut self, color: BallColor) {
        self.target = Some(color);
        self.spawned = 0;
        self.target_spawned = 0;
    }

    /// Current stage target.
    #[must_use]
    pub const fn target(&self) -> Option<BallColor> {
        self.target
    }

    /// Replaces velocity range and spawn interval. Balls already falling keep their speed.
    pub fn set_params(&mut self, params: DifficultyParams) {
        self.params = params;
    }

    /// Current difficulty parameters.
    #[must_use]
    pub const fn params(&self) -> DifficultyParams {
        self.params
    }

    /// Balls spawned since the target was set, and how many carried it.
    #[must_use]
    pub const fn counts(&self) -> (u32, u32) {
        (self.spawned, self.target_spawned)
    }

    /// Spawns one ball, plus its twin when the layout calls for one.
    pub fn spawn(&mut self, layout: &SpawnLayout) -> Spawned {
        let color = self.pick_color();
        let velocity = self.pick_velocity();
        let position = Vec2::new(layout.interactive_x(), -self.radius);

        let mut interactive = Ball::new(self.next_id(), position, velocity, self.radius, color);
        let twin = match layout.twin_x() {
            Some(x) => {
                let pair = PairId(self.next_pair);
                self.next_pair = self.next_pair.wrapping_add(1);
                interactive = interactive.with_pair(pair);
                Some(interactive.twin(self.next_id(), x))
            }
            None => None,
        };

        Spawned { interactive, twin }
    }

    fn pick_color(&mut self) -> BallColor {
        self.spawned += 1;
        let drawn = BallColor::ALL[self.rng.gen_range(0..BallColor::ALL.len())];
        let color = match self.target {
            Some(target)
                if drawn != target
                    && self.target_spawned.saturating_mul(self.floor_denominator) < self.spawned =>
            {
                target
            }
            _ => drawn,
        };
        if Some(color) == self.target {
            self.target_spawned += 1;
        }
        color
    }

    fn pick_velocity(&mut self) -> f32 {
        let DifficultyParams { min_velocity, max_velocity, .. } = self.params;
        if max_velocity <= min_velocity {
            return min_velocity;
        }
        self.rng.gen_range(min_velocity..=max_velocity)
    }

    fn next_id(&mut self) -> BallId {
        let id = BallId(self.next_ball);
        self.next_ball += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> DifficultyParams {
        DifficultyParams { min_velocity: 5.0, max_velocity: 12.0, spawn_interval_ms: 700 }
    }

    #[test]
    fn test_first_ball_carries_target() {
        for seed in 0..20 {
            let mut policy = SpawnPolicy::new(seed, params(), 40.0, 3);
            policy.set_target(BallColor::Green);
            let layout = SpawnLayout { view_width: 1080.0, mirror_mode: MirrorMode::Full, target_offset: 0.0 };
            assert_eq!(policy.spawn(&layout).interactive.color(), BallColor::Green);
        }
    }

    #[test]
    fn test_full_mode_has_no_twin() {
        let mut policy = SpawnPolicy::new(1, params(), 40.0, 3);
        let layout = SpawnLayout { view_width: 1080.0, mirror_mode: MirrorMode::Full, target_offset: 50.0 };
        let spawned = policy.spawn(&layout);
        assert!(spawned.twin.is_none());
        assert_eq!(spawned.interactive.position(), Vec2::new(540.0, -40.0));
        assert_eq!(spawned.interactive.pair(), None);
    }

    #[test]
    fn test_zero_offset_has_no_twin() {
        let mut policy = SpawnPolicy::new(1, params(), 40.0, 3);
        let layout = SpawnLayout { view_width: 1080.0, mirror_mode: MirrorMode::MirrorRight, target_offset: 0.0 };
        assert!(policy.spawn(&layout).twin.is_none());
    }

    #[test]
    fn test_mirror_right_places_twin_left() {
        let mut policy = SpawnPolicy::new(1, params(), 40.0, 3);
        let layout = SpawnLayout { view_width: 1080.0, mirror_mode: MirrorMode::MirrorRight, target_offset: 50.0 };
        let spawned = policy.spawn(&layout);
        let twin = spawned.twin.expect("twin");
        assert_eq!(spawned.interactive.position().x, 590.0);
        assert_eq!(twin.position().x, 490.0);
        assert_ne!(twin.id(), spawned.interactive.id());
    }

    #[test]
    fn test_pair_ids_are_fresh() {
        let mut policy = SpawnPolicy::new(1, params(), 40.0, 3);
        let layout = SpawnLayout { view_width: 1080.0, mirror_mode: MirrorMode::MirrorLeft, target_offset: 50.0 };
        let a = policy.spawn(&layout).interactive.pair();
        let b = policy.spawn(&layout).interactive.pair();
        assert_ne!(a, b);
    }

    #[test]
    fn test_velocity_in_range() {
        let mut policy = SpawnPolicy::new(9, params(), 40.0, 3);
        let layout = SpawnLayout { view_width: 800.0, mirror_mode: MirrorMode::Full, target_offset: 0.0 };
        for _ in 0..200 {
            let v = policy.spawn(&layout).interactive.velocity();
            assert!((5.0..=12.0).contains(&v));
        }
    }

    #[test]
    fn test_fixed_velocity_when_range_is_empty() {
        let fixed = DifficultyParams { min_velocity: 10.0, max_velocity: 10.0, spawn_interval_ms: 100 };
        let mut policy = SpawnPolicy::new(3, fixed, 40.0, 3);
        let layout = SpawnLayout { view_width: 800.0, mirror_mode: MirrorMode::Full, target_offset: 0.0 };
        assert_eq!(policy.spawn(&layout).interactive.velocity(), 10.0);
    }

    #[test]
    fn test_set_target_resets_counts() {
        let mut policy = SpawnPolicy::new(3, params(), 40.0, 3);
        policy.set_target(BallColor::Red);
        let layout = SpawnLayout { view_width: 800.0, mirror_mode: MirrorMode::Full, target_offset: 0.0 };
        for _ in 0..5 {
            policy.spawn(&layout);
        }
        assert_eq!(policy.counts().0, 5);
        policy.set_target(BallColor::Blue);
        assert_eq!(policy.counts(), (0, 0));
    }
}
