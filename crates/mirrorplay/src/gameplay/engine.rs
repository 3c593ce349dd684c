//! # Interaction Engine
//!
//! Fixed-tick simulation of the falling balls.
//!
//! ```text
//! tick(dt):
//! ┌────────────────────────────────────────────────────────────┐
//! │ 1. spawn        interval elapsed and spawning enabled      │
//! │ 2. physics      y += velocity, purge when top > height     │
//! │ 3. popups       count down, drop expired                   │
//! │ 4. pop anims    advance, drop finished balls + their pair  │
//! │ 5. mask         sample latest hit-mask at each ball center │
//! │ 6. redraw       raise the redraw flag                      │
//! └────────────────────────────────────────────────────────────┘
//! pointer_down(p):  every interactive, non-hit ball containing p
//! ```
//!
//! All state here is owned by the game context. Masks arrive from the
//! segmentation worker as owned values; nothing is shared across threads.

use std::collections::HashSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use mirrorplay_shared::{BallColor, DifficultyParams, GameConfig, MirrorMode, Vec2};
use mirrorplay_vision::HitMask;

use super::ball::{Ball, BallId, PairId};
use super::popup::{place_popup, PopupImage};
use super::spawn::{SpawnLayout, SpawnPolicy, Spawned};

/// What caught a ball.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TapSource {
    /// A pointer press.
    Touch,
    /// The body silhouette.
    Mask,
}

/// A ball caught by touch or by the segmentation mask.
///
/// Emitted exactly once per ball: the hit flag guards it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallTap {
    /// Ball that was caught.
    pub ball: BallId,
    /// Its color.
    pub color: BallColor,
    /// Where it was when caught.
    pub position: Vec2,
    /// What caught it.
    pub source: TapSource,
}

/// Owns balls, popups and the latest mask.
pub struct InteractionEngine {
    balls: Vec<Ball>,
    popups: Vec<PopupImage>,
    mask: Option<HitMask>,
    spawner: SpawnPolicy,
    spawning: bool,
    since_spawn: Duration,
    view: (f32, f32),
    mirror_mode: MirrorMode,
    target_offset: f32,
    pop_duration: Duration,
    popup_duration: Duration,
    popup_size: (f32, f32),
    popup_rng: StdRng,
    redraw: bool,
}

impl InteractionEngine {
    /// Creates an engine for a view of `view` pixels.
    ///
    /// `seed` drives both the spawn policy and popup placement.
    #[must_use]
    pub fn new(config: &GameConfig, params: DifficultyParams, view: (f32, f32), seed: u64) -> Self {
        Self {
            balls: Vec::with_capacity(64),
            popups: Vec::with_capacity(8),
            mask: None,
            spawner: SpawnPolicy::new(
                seed,
                params,
                config.ball_radius,
                config.target_floor_denominator,
            ),
            spawning: false,
            since_spawn: Duration::ZERO,
            view,
            mirror_mode: MirrorMode::Full,
            target_offset: 0.0,
            pop_duration: config.pop_duration(),
            popup_duration: config.popup_duration(),
            popup_size: config.popup_size,
            popup_rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
            redraw: false,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Enables or disables spawning. Enabling spawns on the next tick.
    pub fn set_spawning(&mut self, enabled: bool) {
        if enabled && !self.spawning {
            self.since_spawn = self.spawn_interval();
        }
        self.spawning = enabled;
    }

    /// True while new balls are being spawned.
    #[must_use]
    pub const fn is_spawning(&self) -> bool {
        self.spawning
    }

    /// Sets the stage target color and resets the frequency floor.
    pub fn set_target(&mut self, color: BallColor) {
        self.spawner.set_target(color);
    }

    /// Current stage target color.
    #[must_use]
    pub const fn target(&self) -> Option<BallColor> {
        self.spawner.target()
    }

    /// Applies difficulty to balls spawned from now on.
    pub fn set_difficulty(&mut self, params: DifficultyParams) {
        self.spawner.set_params(params);
    }

    /// Mirror mode used to place new balls.
    pub fn set_mirror_mode(&mut self, mode: MirrorMode) {
        self.mirror_mode = mode;
    }

    /// Horizontal offset between interactive balls and the center line.
    pub fn set_target_offset(&mut self, offset: f32) {
        self.target_offset = offset.max(0.0);
    }

    /// New view size. Balls keep their view coordinates.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.view = (width, height);
    }

    /// Current view size.
    #[must_use]
    pub const fn view(&self) -> (f32, f32) {
        self.view
    }

    /// Replaces the latest mask. `None` disables mask collisions until the next one.
    pub fn update_mask(&mut self, mask: Option<HitMask>) {
        self.mask = mask;
    }

    /// Latest mask, if any.
    #[must_use]
    pub fn mask(&self) -> Option<&HitMask> {
        self.mask.as_ref()
    }

    // =========================================================================
    // Snapshot for rendering
    // =========================================================================

    /// Live balls, in spawn order.
    #[must_use]
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    /// Live popups.
    #[must_use]
    pub fn popups(&self) -> &[PopupImage] {
        &self.popups
    }

    /// Returns and clears the redraw flag.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Runs one fixed tick and returns the balls the mask caught.
    pub fn tick(&mut self, dt: Duration) -> Vec<BallTap> {
        // 1. Spawn
        if self.spawning {
            self.since_spawn += dt;
            if self.since_spawn >= self.spawn_interval() {
                self.spawn_now();
                self.since_spawn = Duration::ZERO;
            }
        }

        // 2. Physics
        let height = self.view.1;
        for ball in &mut self.balls {
            ball.fall();
        }
        let before = self.balls.len();
        self.balls.retain(|ball| ball.top() <= height);
        let fell = before - self.balls.len();
        if fell > 0 {
            tracing::trace!("{} ball(s) left the view", fell);
        }

        // 3. Popups
        self.popups.retain_mut(|popup| !popup.tick(dt));

        // 4. Pop animations
        self.advance_pops(dt);

        // 5. Mask
        let taps = self.check_mask_collisions();

        // 6. Redraw
        self.redraw = true;
        taps
    }

    /// Spawns a ball (and its twin) immediately, regardless of the timer.
    pub fn spawn_now(&mut self) -> BallId {
        let layout = SpawnLayout {
            view_width: self.view.0,
            mirror_mode: self.mirror_mode,
            target_offset: self.target_offset,
        };
        let Spawned { interactive, twin } = self.spawner.spawn(&layout);
        let id = interactive.id();
        self.balls.push(interactive);
        if let Some(twin) = twin {
            self.balls.push(twin);
        }
        self.redraw = true;
        id
    }

    /// Tests every non-hit ball against the latest mask.
    ///
    /// Ball centers are mapped into mask space with independent horizontal
    /// and vertical scale factors and clamped to the mask bounds.
    pub fn check_mask_collisions(&mut self) -> Vec<BallTap> {
        let Some(mask) = self.mask.as_ref() else {
            return Vec::new();
        };
        let (width, height) = self.view;
        let touched: Vec<usize> = self
            .balls
            .iter()
            .enumerate()
            .filter(|(_, ball)| !ball.is_hit())
            .filter(|(_, ball)| {
                let p = ball.position();
                mask.sample_view(p.x, p.y, width, height)
            })
            .map(|(index, _)| index)
            .collect();

        touched
            .into_iter()
            .filter_map(|index| self.hit(index, TapSource::Mask))
            .collect()
    }

    /// Press at `point` in view coordinates.
    ///
    /// Every interactive, non-hit ball under the point is caught; twins
    /// ignore touches.
    pub fn pointer_down(&mut self, point: Vec2) -> Vec<BallTap> {
        let touched: Vec<usize> = self
            .balls
            .iter()
            .enumerate()
            .filter(|(_, ball)| !ball.is_mirror() && !ball.is_hit() && ball.contains(point))
            .map(|(index, _)| index)
            .collect();

        let taps: Vec<BallTap> = touched
            .into_iter()
            .filter_map(|index| self.hit(index, TapSource::Touch))
            .collect();
        if !taps.is_empty() {
            self.redraw = true;
        }
        taps
    }

    /// Shows a success popup for `cue`.
    pub fn show_popup(&mut self, cue: usize) {
        let origin = place_popup(&mut self.popup_rng, self.view, self.popup_size);
        self.popups.push(PopupImage {
            cue,
            origin,
            size: self.popup_size,
            remaining: self.popup_duration,
        });
        self.redraw = true;
    }

    /// Removes every ball. Popups keep counting down.
    pub fn clear_balls(&mut self) {
        self.balls.clear();
        self.redraw = true;
    }

    /// Removes every popup still on screen.
    pub fn clear_popups(&mut self) {
        self.popups.clear();
        self.redraw = true;
    }

    /// Removes balls and popups and forgets the mask.
    pub fn reset(&mut self) {
        self.balls.clear();
        self.popups.clear();
        self.mask = None;
        self.since_spawn = Duration::ZERO;
        self.redraw = true;
    }

    fn spawn_interval(&self) -> Duration {
        self.spawner.params().spawn_interval()
    }

    /// Marks the ball at `index` hit, along with every other member of its
    /// pair. Only the ball at `index` produces a tap.
    fn hit(&mut self, index: usize, source: TapSource) -> Option<BallTap> {
        let pop = self.pop_duration;
        let ball = self.balls.get_mut(index)?;
        if !ball.mark_hit(pop) {
            return None;
        }
        let tap = BallTap {
            ball: ball.id(),
            color: ball.color(),
            position: ball.position(),
            source,
        };
        if let Some(pair) = ball.pair() {
            for other in self.balls.iter_mut().filter(|b| b.pair() == Some(pair)) {
                other.mark_hit(pop);
            }
        }
        tracing::debug!("Ball {:?} caught by {:?}", tap.ball, source);
        Some(tap)
    }

    fn advance_pops(&mut self, dt: Duration) {
        let mut done_pairs: HashSet<PairId> = HashSet::new();
        let mut any_done = false;
        for ball in &mut self.balls {
            if ball.advance_pop(dt) {
                any_done = true;
                if let Some(pair) = ball.pair() {
                    done_pairs.insert(pair);
                }
            }
        }
        if any_done {
            self.balls.retain(|ball| {
                !ball.is_popped() && ball.pair().map_or(true, |pair| !done_pairs.contains(&pair))
            });
        }
    }
}
