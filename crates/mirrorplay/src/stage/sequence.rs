//! Countdown and stage-over sequences.
//!
//! ```text
//! Countdown:  |-- Get Ready! fade + hold --|  3  |  2  |  1  | Go!
//!             0                         lead_in  +step +step +step
//!
//! Stage over: |-- fade in --|-- hold --|-- fade out --| next countdown
//! ```
//!
//! Each sequence is a cursor over a fixed list of cues; `advance` yields the
//! cues that became due, in order.

use std::time::Duration;

use mirrorplay_shared::constants::COUNTDOWN_FROM;
use mirrorplay_shared::SequenceTimings;

/// A step of the countdown sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownCue {
    /// "Get Ready!" appears.
    GetReady,
    /// A countdown number with its sound cue.
    Number(u8),
    /// "Go!"; the stage starts.
    Go,
}

/// Cursor over the countdown cues.
#[derive(Clone, Debug)]
pub struct CountdownSequence {
    lead_in: Duration,
    step: Duration,
    elapsed: Duration,
    emitted: u8,
}

impl CountdownSequence {
    /// Creates a sequence at its start.
    #[must_use]
    pub fn new(timings: &SequenceTimings) -> Self {
        Self {
            lead_in: timings.lead_in(),
            step: timings.countdown_step(),
            elapsed: Duration::ZERO,
            emitted: 0,
        }
    }

    /// Advances by `dt` and appends every cue that became due.
    pub fn advance(&mut self, dt: Duration, out: &mut Vec<CountdownCue>) {
        self.elapsed += dt;
        while let Some((cue, due)) = self.cue_at(self.emitted) {
            if self.elapsed < due {
                break;
            }
            out.push(cue);
            self.emitted += 1;
        }
    }

    /// True once `Go` has been emitted.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.cue_at(self.emitted).is_none()
    }

    /// Cue number `index` and when it is due.
    fn cue_at(&self, index: u8) -> Option<(CountdownCue, Duration)> {
        let numbers = COUNTDOWN_FROM;
        match index {
            0 => Some((CountdownCue::GetReady, Duration::ZERO)),
            i if i <= numbers => {
                let k = u32::from(i - 1);
                Some((CountdownCue::Number(numbers - (i - 1)), self.lead_in + self.step * k))
            }
            i if i == numbers + 1 => {
                Some((CountdownCue::Go, self.lead_in + self.step * u32::from(numbers)))
            }
            _ => None,
        }
    }
}

/// Fade state of the "Stage over!" message.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageOverPhase {
    /// Fading in.
    FadeIn,
    /// Fully visible.
    Hold,
    /// Fading out.
    FadeOut,
    /// Gone; the next countdown may start.
    Done,
}

/// Timeline of the stage-over message.
#[derive(Clone, Debug)]
pub struct StageOverSequence {
    fade: Duration,
    hold: Duration,
    elapsed: Duration,
}

impl StageOverSequence {
    /// Creates a sequence at its start.
    #[must_use]
    pub fn new(timings: &SequenceTimings) -> Self {
        Self {
            fade: Duration::from_millis(timings.stage_over_fade_ms),
            hold: Duration::from_millis(timings.stage_over_hold_ms),
            elapsed: Duration::ZERO,
        }
    }

    /// Advances by `dt` and returns the current phase.
    pub fn advance(&mut self, dt: Duration) -> StageOverPhase {
        self.elapsed += dt;
        self.phase()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> StageOverPhase {
        if self.elapsed < self.fade {
            StageOverPhase::FadeIn
        } else if self.elapsed < self.fade + self.hold {
            StageOverPhase::Hold
        } else if self.elapsed < self.fade * 2 + self.hold {
            StageOverPhase::FadeOut
        } else {
            StageOverPhase::Done
        }
    }

    /// Message opacity in `[0, 1]`.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        let fade = self.fade.as_secs_f32();
        if fade <= 0.0 {
            return if self.phase() == StageOverPhase::Done { 0.0 } else { 1.0 };
        }
        match self.phase() {
            StageOverPhase::FadeIn => self.elapsed.as_secs_f32() / fade,
            StageOverPhase::Hold => 1.0,
            StageOverPhase::FadeOut => {
                let into = (self.elapsed - self.fade - self.hold).as_secs_f32();
                1.0 - into / fade
            }
            StageOverPhase::Done => 0.0,
        }
    }
}
