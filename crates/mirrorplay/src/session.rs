//! # Game Session
//!
//! One screen's worth of game: explicitly constructed, explicitly started,
//! dropped when the screen goes away.
//!
//! ```text
//!                    ┌────────────────────── GameSession ───────────────────────┐
//!  wall clock ──────►│ TickLoop ──► InteractionEngine::tick ──► BallTap ──┐     │
//!                    │                      ▲                            ▼     │
//!  AnalysisOutcome ─►│ update_mask ─────────┘            StageOrchestrator ────┼──► UiEvent
//!                    │                                                         │
//!  pointer_down ────►│ InteractionEngine::pointer_down ──► BallTap ──┘         │
//!                    │                                                         │
//!  settings ────────►│ apply_settings ──► SharedTunables (render context)      │
//!                    └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything in here runs on the game context. The only state shared with
//! other threads is the [`SharedTunables`] handle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use mirrorplay_core::SharedTunables;
use mirrorplay_shared::{GameConfig, MirrorMode, Orientation, StageSettings, Vec2};
use mirrorplay_vision::{AnalysisOutcome, AutoOrientation, SegmentationWorker};

use crate::error::SessionResult;
use crate::events::{EventSender, UiEvent};
use crate::game_loop::TickLoop;
use crate::gameplay::{BallTap, InteractionEngine};
use crate::profile::ProfileStore;
use crate::stage::StageOrchestrator;

/// Composition of engine, orchestrator and tick loop for one screen.
pub struct GameSession {
    config: GameConfig,
    engine: InteractionEngine,
    orchestrator: StageOrchestrator,
    tunables: Arc<SharedTunables>,
    auto_orientation: Option<AutoOrientation>,
    tick_loop: TickLoop,
    events: EventSender,
}

impl GameSession {
    /// Builds a session from a validated config and the stored profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or the profile cannot be loaded.
    pub fn new(
        config: GameConfig,
        store: Box<dyn ProfileStore>,
        tunables: Arc<SharedTunables>,
        events: EventSender,
        view: (f32, f32),
        seed: u64,
    ) -> SessionResult<Self> {
        config.validate()?;
        let profile = store.load()?;
        let settings = profile.settings.clone();
        tracing::info!("Session for {} (record {})", profile.name, profile.record);

        let engine = InteractionEngine::new(
            &config,
            config.difficulty.params(settings.difficulty),
            view,
            seed,
        );
        let orchestrator =
            StageOrchestrator::new(&config, profile, store, events.clone(), seed.wrapping_add(2));
        let tick_loop = TickLoop::new(config.tick_interval());

        let mut session = Self {
            config,
            engine,
            orchestrator,
            tunables,
            auto_orientation: None,
            tick_loop,
            events,
        };
        session.apply_settings(settings);
        Ok(session)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Begins the first countdown.
    pub fn start(&mut self) {
        self.orchestrator.start(&mut self.engine);
    }

    /// Restart request from the menu.
    pub fn restart(&mut self) {
        self.orchestrator.restart(&mut self.engine);
    }

    /// Feeds wall-clock time and runs every tick that became due.
    ///
    /// Returns the number of ticks run.
    pub fn advance_to(&mut self, now: Instant) -> u32 {
        self.tick_loop.advance_to(now);
        self.run_due_ticks()
    }

    /// Feeds `elapsed` and runs every tick that became due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.tick_loop.advance(elapsed);
        self.run_due_ticks()
    }

    /// Runs exactly one tick of `dt`.
    pub fn tick(&mut self, dt: Duration) {
        let taps = self.engine.tick(dt);
        self.score(&taps);
        self.orchestrator.update(dt, &mut self.engine);

        if let Some(auto) = self.auto_orientation.as_mut() {
            let current = self.tunables.mirror_mode();
            if let Some(mode) = auto.update(dt, self.engine.mask(), current) {
                tracing::info!("Auto orientation switched to {:?}", mode);
                self.set_mirror_mode(mode);
            }
        }
    }

    fn run_due_ticks(&mut self) -> u32 {
        let dt = self.tick_loop.tick_duration();
        let mut ran = 0;
        while self.tick_loop.should_tick() {
            let start = self.tick_loop.begin_tick();
            self.tick(dt);
            self.tick_loop.end_tick(start);
            ran += 1;
        }
        ran
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// Press at `(x, y)` in view coordinates. Returns the balls caught.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Vec<BallTap> {
        let taps = self.engine.pointer_down(Vec2::new(x, y));
        self.score(&taps);
        taps
    }

    /// Takes a segmentation result. A failed analysis clears the mask, so
    /// collisions are skipped until the next one arrives.
    pub fn on_analysis(&mut self, outcome: AnalysisOutcome) {
        if outcome.mask.is_none() {
            tracing::trace!("No mask for analysis #{}", outcome.sequence);
        }
        self.engine.update_mask(outcome.mask);
    }

    /// Pulls the newest finished analysis from `worker`, if any.
    pub fn poll_worker(&mut self, worker: &mut SegmentationWorker) -> bool {
        match worker.drain_latest() {
            Some(outcome) => {
                self.on_analysis(outcome);
                true
            }
            None => false,
        }
    }

    /// View size changed.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.engine.resize(width, height);
    }

    /// Applies preferences live.
    ///
    /// Difficulty affects balls spawned from now on; a shorter stage
    /// duration cuts the running stage short.
    pub fn apply_settings(&mut self, settings: StageSettings) {
        match settings.orientation {
            Orientation::Auto => {
                if self.auto_orientation.is_none() {
                    self.auto_orientation = Some(AutoOrientation::new(&self.config.auto_orientation));
                    self.set_mirror_mode(MirrorMode::Full);
                }
            }
            fixed => {
                self.auto_orientation = None;
                self.set_mirror_mode(fixed.initial_mirror_mode());
            }
        }
        self.tunables.set_segmentation_visible(settings.segmentation_visible);
        self.engine.set_difficulty(self.config.difficulty.params(settings.difficulty));
        self.engine.set_target_offset(settings.target_offset as f32);
        self.orchestrator.apply_settings(&settings);

        tracing::info!(
            "Settings applied: {} / {} / {}s / offset {} / mask {}",
            settings.orientation.as_str(),
            settings.difficulty.as_str(),
            settings.stage_duration_secs,
            settings.target_offset,
            if settings.segmentation_visible { "on" } else { "off" }
        );
    }

    /// Explicit mirror mode, as from a mode switch. Disables auto orientation.
    pub fn set_mirror_mode_override(&mut self, mode: MirrorMode) {
        self.auto_orientation = None;
        self.set_mirror_mode(mode);
    }

    fn set_mirror_mode(&mut self, mode: MirrorMode) {
        let previous = self.tunables.set_mirror_mode(mode);
        self.engine.set_mirror_mode(mode);
        if previous != mode {
            self.events.send(UiEvent::MirrorModeChanged(mode));
        }
    }

    fn score(&mut self, taps: &[BallTap]) {
        for tap in taps {
            self.orchestrator.on_ball_tapped(tap, &mut self.engine);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Interaction engine, for drawing.
    #[must_use]
    pub const fn engine(&self) -> &InteractionEngine {
        &self.engine
    }

    /// Mutable interaction engine.
    pub fn engine_mut(&mut self) -> &mut InteractionEngine {
        &mut self.engine
    }

    /// Stage state machine.
    #[must_use]
    pub const fn orchestrator(&self) -> &StageOrchestrator {
        &self.orchestrator
    }

    /// Shared tunables handle.
    #[must_use]
    pub fn tunables(&self) -> &Arc<SharedTunables> {
        &self.tunables
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// True while auto orientation is in charge of the mirror mode.
    #[must_use]
    pub const fn is_auto_orienting(&self) -> bool {
        self.auto_orientation.is_some()
    }

    /// Time until the next tick is due, for scheduling the next wake-up.
    #[must_use]
    pub fn time_to_next_tick(&self) -> Duration {
        self.tick_loop.time_to_next_tick()
    }

    /// Tick loop statistics.
    #[must_use]
    pub const fn tick_stats(&self) -> &crate::game_loop::TickStats {
        self.tick_loop.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::profile::MemoryProfileStore;
    use mirrorplay_shared::{Difficulty, UserProfile};

    fn session_with(settings: StageSettings) -> (GameSession, crate::events::EventReceiver) {
        let mut profile = UserProfile::new("test");
        profile.settings = settings;
        let store = MemoryProfileStore::new(profile);
        let (tx, rx) = EventBus::create_pair(4096);
        let tunables = Arc::new(SharedTunables::new(MirrorMode::Full));
        let session = GameSession::new(
            GameConfig::default(),
            Box::new(store),
            tunables,
            tx,
            (1080.0, 1920.0),
            42,
        )
        .unwrap();
        (session, rx)
    }

    #[test]
    fn test_profile_orientation_reaches_tunables() {
        let settings = StageSettings { orientation: Orientation::LeftMirrored, ..Default::default() };
        let (session, rx) = session_with(settings);
        assert_eq!(session.tunables().mirror_mode(), MirrorMode::MirrorLeft);
        assert!(rx.drain().contains(&UiEvent::MirrorModeChanged(MirrorMode::MirrorLeft)));
    }

    #[test]
    fn test_segmentation_visibility_is_live() {
        let (mut session, _rx) = session_with(StageSettings::default());
        assert!(!session.tunables().segmentation_visible());
        session.apply_settings(StageSettings { segmentation_visible: true, ..Default::default() });
        assert!(session.tunables().segmentation_visible());
    }

    #[test]
    fn test_auto_orientation_starts_full() {
        let settings = StageSettings { orientation: Orientation::Auto, ..Default::default() };
        let (mut session, _rx) = session_with(settings);
        assert!(session.is_auto_orienting());
        assert_eq!(session.tunables().mirror_mode(), MirrorMode::Full);

        session.set_mirror_mode_override(MirrorMode::MirrorRight);
        assert!(!session.is_auto_orienting());
        assert_eq!(session.tunables().mirror_mode(), MirrorMode::MirrorRight);
    }

    #[test]
    fn test_advance_runs_fixed_ticks() {
        let (mut session, _rx) = session_with(StageSettings::default());
        assert_eq!(session.advance(Duration::from_millis(50)), 3);
        assert_eq!(session.advance(Duration::from_millis(14)), 1);
    }

    #[test]
    fn test_next_tick_deadline_tracks_fed_time() {
        let (mut session, _rx) = session_with(StageSettings::default());
        assert_eq!(session.time_to_next_tick(), Duration::from_millis(16));
        assert_eq!(session.advance(Duration::from_millis(10)), 0);
        assert_eq!(session.time_to_next_tick(), Duration::from_millis(6));
        assert_eq!(session.advance(Duration::from_millis(6)), 1);
        assert_eq!(session.time_to_next_tick(), Duration::from_millis(16));
    }

    #[test]
    fn test_wall_clock_ticks_without_rendering() {
        // Waking once per tick deadline keeps game time in step with the clock.
        let (mut session, _rx) = session_with(StageSettings::default());
        let t0 = Instant::now();
        session.advance_to(t0);
        let mut now = t0;
        let mut ran = 0;
        for _ in 0..125 {
            now += session.time_to_next_tick();
            ran += session.advance_to(now);
        }
        assert_eq!(ran, 125);
        assert_eq!(session.tick_stats().dropped_ticks, 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = GameConfig::default();
        config.mask_threshold = 0.0;
        let (tx, _rx) = EventBus::create_pair(8);
        let result = GameSession::new(
            config,
            Box::new(MemoryProfileStore::default()),
            Arc::new(SharedTunables::new(MirrorMode::Full)),
            tx,
            (100.0, 100.0),
            1,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_difficulty_change_keeps_falling_balls() {
        let (mut session, _rx) = session_with(StageSettings::default());
        session.engine_mut().spawn_now();
        let v = session.engine().balls()[0].velocity();
        session.apply_settings(StageSettings { difficulty: Difficulty::Hard, ..Default::default() });
        assert_eq!(session.engine().balls()[0].velocity(), v);
        session.engine_mut().spawn_now();
        assert!(session.engine().balls()[1].velocity() >= 20.0);
    }
}
