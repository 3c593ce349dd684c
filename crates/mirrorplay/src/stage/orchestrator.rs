//! # Stage Orchestrator
//!
//! ```text
//!            start()                 Go                 timer Finish
//!   Idle ───────────► Countdown ───────────► Active ───────────────► StageOver
//!                        ▲                                              │
//!                        └──────────── message faded out ───────────────┘
//!
//!   restart(): any phase ──► Countdown (counters reset, balls cleared)
//! ```
//!
//! The orchestrator never owns the balls. Every operation that touches them
//! takes the [`InteractionEngine`] by mutable reference, so the game context
//! stays the single writer.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use mirrorplay_shared::constants::{COUNTDOWN_FROM, STAGE_TICK_INTERVAL, SUCCESS_CUE_COUNT};
use mirrorplay_shared::{BallColor, GameConfig, SequenceTimings, StageSettings, UserProfile};

use crate::events::{EventSender, UiEvent};
use crate::gameplay::{BallTap, InteractionEngine};
use crate::profile::ProfileStore;

use super::sequence::{CountdownCue, CountdownSequence, StageOverPhase, StageOverSequence};
use super::timer::{StageTimer, TimerEvent};

/// Phase of the stage state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StagePhase {
    /// Nothing started yet.
    #[default]
    Idle,
    /// "Get Ready!" and 3-2-1-Go.
    Countdown,
    /// Balls are falling and the stage timer runs.
    Active,
    /// "Stage over!" is on screen.
    StageOver,
}

/// Per-stage counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageStats {
    /// Target-colored balls caught.
    pub successes: u32,
    /// Other balls caught.
    pub misses: u32,
}

/// Drives countdown, play and stage-over phases.
pub struct StageOrchestrator {
    phase: StagePhase,
    timings: SequenceTimings,
    countdown: CountdownSequence,
    stage_over: StageOverSequence,
    timer: StageTimer,
    stage_duration: Duration,
    target: Option<BallColor>,
    stats: StageStats,
    profile: UserProfile,
    store: Box<dyn ProfileStore>,
    events: EventSender,
    rng: StdRng,
    cues: Vec<CountdownCue>,
}

impl StageOrchestrator {
    /// Creates an idle orchestrator for `profile`.
    #[must_use]
    pub fn new(
        config: &GameConfig,
        profile: UserProfile,
        store: Box<dyn ProfileStore>,
        events: EventSender,
        seed: u64,
    ) -> Self {
        let timings = config.sequence;
        Self {
            phase: StagePhase::Idle,
            timings,
            countdown: CountdownSequence::new(&timings),
            stage_over: StageOverSequence::new(&timings),
            timer: StageTimer::new(STAGE_TICK_INTERVAL),
            stage_duration: stage_duration(&profile.settings),
            target: None,
            stats: StageStats::default(),
            profile,
            store,
            events,
            rng: StdRng::seed_from_u64(seed),
            cues: Vec::with_capacity(8),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> StagePhase {
        self.phase
    }

    /// Counters of the current stage.
    #[must_use]
    pub const fn stats(&self) -> StageStats {
        self.stats
    }

    /// Target color of the current stage.
    #[must_use]
    pub const fn target(&self) -> Option<BallColor> {
        self.target
    }

    /// Best stage score on record.
    #[must_use]
    pub const fn record(&self) -> u32 {
        self.profile.record
    }

    /// Profile as currently known, including live settings.
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Stage timer.
    #[must_use]
    pub const fn timer(&self) -> &StageTimer {
        &self.timer
    }

    /// Configured stage length.
    #[must_use]
    pub const fn stage_duration(&self) -> Duration {
        self.stage_duration
    }

    /// Opacity of the "Stage over!" message, zero outside `StageOver`.
    #[must_use]
    pub fn stage_over_opacity(&self) -> f32 {
        if self.phase == StagePhase::StageOver {
            self.stage_over.opacity()
        } else {
            0.0
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Leaves `Idle` and begins the first countdown. Ignored in other phases.
    pub fn start(&mut self, engine: &mut InteractionEngine) {
        if self.phase != StagePhase::Idle {
            tracing::debug!("start() ignored in {:?}", self.phase);
            return;
        }
        self.enter_countdown(engine);
    }

    /// Resets counters, clears balls and popups, and re-enters `Countdown`
    /// from any phase.
    pub fn restart(&mut self, engine: &mut InteractionEngine) {
        tracing::info!("Stage restart requested in {:?}", self.phase);
        engine.clear_balls();
        engine.clear_popups();
        self.enter_countdown(engine);
    }

    /// Advances sequences and the stage timer by `dt`.
    pub fn update(&mut self, dt: Duration, engine: &mut InteractionEngine) {
        match self.phase {
            StagePhase::Idle => {}
            StagePhase::Countdown => self.advance_countdown(dt, engine),
            StagePhase::Active => match self.timer.advance(dt) {
                Some(TimerEvent::Tick { seconds_remaining }) => {
                    self.emit(UiEvent::StageTick { seconds_remaining });
                }
                Some(TimerEvent::Finish) => self.end_stage(engine),
                None => {}
            },
            StagePhase::StageOver => {
                if self.stage_over.advance(dt) == StageOverPhase::Done {
                    self.enter_countdown(engine);
                }
            }
        }
    }

    /// Scores a caught ball. Only counted while `Active`.
    pub fn on_ball_tapped(&mut self, tap: &BallTap, engine: &mut InteractionEngine) {
        if self.phase != StagePhase::Active {
            tracing::debug!("Ball {:?} caught outside play, not scored", tap.ball);
            return;
        }
        let was_target_match = self.target == Some(tap.color);
        self.emit(UiEvent::BallTapped { color: tap.color, was_target_match });

        if was_target_match {
            self.stats.successes += 1;
            let cue = self.rng.gen_range(0..SUCCESS_CUE_COUNT);
            engine.show_popup(cue);
            self.emit(UiEvent::Success { cue, successes: self.stats.successes });
        } else {
            self.stats.misses += 1;
            self.emit(UiEvent::Miss { misses: self.stats.misses });
        }
    }

    /// Applies new preferences. A shorter stage duration cuts the running
    /// stage short; a longer one applies from the next stage.
    pub fn apply_settings(&mut self, settings: &StageSettings) {
        self.profile.settings = settings.clone();
        let duration = stage_duration(settings);
        self.stage_duration = duration;
        if self.phase == StagePhase::Active && self.timer.remaining() > duration {
            tracing::info!(
                "Stage duration cut to {}s ({:?} were left)",
                settings.stage_duration_secs,
                self.timer.remaining()
            );
            self.timer.start(duration);
        }
    }

    fn enter_countdown(&mut self, engine: &mut InteractionEngine) {
        self.timer.cancel();
        engine.set_spawning(false);
        self.stats = StageStats::default();

        let target = BallColor::ALL[self.rng.gen_range(0..BallColor::ALL.len())];
        self.target = Some(target);
        engine.set_target(target);

        self.countdown = CountdownSequence::new(&self.timings);
        self.set_phase(StagePhase::Countdown);
        tracing::info!("Countdown started, target {}", target.name());
        self.advance_countdown(Duration::ZERO, engine);
    }

    fn advance_countdown(&mut self, dt: Duration, engine: &mut InteractionEngine) {
        let mut cues = std::mem::take(&mut self.cues);
        self.countdown.advance(dt, &mut cues);
        for cue in cues.drain(..) {
            match cue {
                CountdownCue::GetReady => self.emit(UiEvent::GetReady),
                CountdownCue::Number(value) => {
                    if value == COUNTDOWN_FROM {
                        if let Some(color) = self.target {
                            self.emit(UiEvent::TargetAnnounced { color, prompt: color.target_prompt() });
                        }
                    }
                    self.emit(UiEvent::Countdown { value });
                }
                CountdownCue::Go => {
                    self.emit(UiEvent::Go);
                    self.enter_active(engine);
                }
            }
        }
        self.cues = cues;
    }

    fn enter_active(&mut self, engine: &mut InteractionEngine) {
        engine.set_spawning(true);
        self.timer.start(self.stage_duration);
        self.set_phase(StagePhase::Active);
        tracing::info!("Stage active for {:?}", self.stage_duration);
    }

    fn end_stage(&mut self, engine: &mut InteractionEngine) {
        engine.set_spawning(false);
        engine.clear_balls();

        let final_success_count = self.stats.successes;
        let new_record = final_success_count > self.profile.record;
        if new_record {
            tracing::info!(
                "New record for {}: {} (was {})",
                self.profile.name,
                final_success_count,
                self.profile.record
            );
            self.profile.record = final_success_count;
            if let Err(e) = self.store.save(&self.profile) {
                tracing::error!("Failed to save record: {}", e);
            }
        }
        tracing::info!(
            "Stage over: {} successes, {} misses",
            final_success_count,
            self.stats.misses
        );
        self.emit(UiEvent::StageEnded { final_success_count, new_record });

        self.stage_over = StageOverSequence::new(&self.timings);
        self.set_phase(StagePhase::StageOver);
    }

    fn set_phase(&mut self, phase: StagePhase) {
        self.phase = phase;
        self.emit(UiEvent::SequencePhase(phase));
    }

    fn emit(&self, event: UiEvent) {
        self.events.send(event);
    }
}

fn stage_duration(settings: &StageSettings) -> Duration {
    Duration::from_secs(u64::from(settings.stage_duration_secs.max(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::profile::MemoryProfileStore;

    fn setup() -> (StageOrchestrator, InteractionEngine, crate::events::EventReceiver) {
        let config = GameConfig::default();
        let (tx, rx) = EventBus::create_pair(1024);
        let store = MemoryProfileStore::default();
        let profile = store.snapshot();
        let orchestrator = StageOrchestrator::new(&config, profile, Box::new(store), tx, 5);
        let engine = InteractionEngine::new(&config, config.difficulty.medium, (1080.0, 1920.0), 5);
        (orchestrator, engine, rx)
    }

    #[test]
    fn test_start_emits_get_ready() {
        let (mut orch, mut engine, rx) = setup();
        orch.start(&mut engine);
        assert_eq!(orch.phase(), StagePhase::Countdown);
        assert!(orch.target().is_some());
        assert_eq!(engine.target(), orch.target());
        assert_eq!(
            rx.drain(),
            vec![UiEvent::SequencePhase(StagePhase::Countdown), UiEvent::GetReady]
        );
    }

    #[test]
    fn test_start_twice_is_ignored() {
        let (mut orch, mut engine, rx) = setup();
        orch.start(&mut engine);
        rx.drain();
        orch.start(&mut engine);
        assert!(rx.drain().is_empty());
    }

    #[test]
    fn test_taps_outside_active_are_not_scored() {
        let (mut orch, mut engine, _rx) = setup();
        orch.start(&mut engine);
        let tap = BallTap {
            ball: crate::gameplay::BallId(0),
            color: BallColor::Red,
            position: mirrorplay_shared::Vec2::ZERO,
            source: crate::gameplay::TapSource::Touch,
        };
        orch.on_ball_tapped(&tap, &mut engine);
        assert_eq!(orch.stats(), StageStats::default());
    }

    #[test]
    fn test_restart_clears_success_popups() {
        let (mut orch, mut engine, _rx) = setup();
        orch.start(&mut engine);
        orch.update(Duration::from_secs(6), &mut engine);
        assert_eq!(orch.phase(), StagePhase::Active);
        let tap = BallTap {
            ball: crate::gameplay::BallId(0),
            color: orch.target().unwrap(),
            position: mirrorplay_shared::Vec2::ZERO,
            source: crate::gameplay::TapSource::Touch,
        };
        orch.on_ball_tapped(&tap, &mut engine);
        assert_eq!(engine.popups().len(), 1);

        orch.restart(&mut engine);
        assert!(engine.popups().is_empty());
        assert_eq!(orch.phase(), StagePhase::Countdown);
    }

    #[test]
    fn test_longer_duration_does_not_extend_running_stage() {
        let (mut orch, mut engine, _rx) = setup();
        orch.start(&mut engine);
        orch.update(Duration::from_secs(6), &mut engine);
        assert_eq!(orch.phase(), StagePhase::Active);
        orch.update(Duration::from_secs(3), &mut engine);

        let before = orch.timer().remaining();
        let settings = StageSettings { stage_duration_secs: 60, ..StageSettings::default() };
        orch.apply_settings(&settings);
        assert_eq!(orch.timer().remaining(), before);
        assert_eq!(orch.stage_duration(), Duration::from_secs(60));
    }

    #[test]
    fn test_shorter_duration_cuts_running_stage() {
        let (mut orch, mut engine, _rx) = setup();
        orch.start(&mut engine);
        orch.update(Duration::from_secs(6), &mut engine);
        let settings = StageSettings { stage_duration_secs: 2, ..StageSettings::default() };
        orch.apply_settings(&settings);
        assert_eq!(orch.timer().remaining(), Duration::from_secs(2));
    }
}
