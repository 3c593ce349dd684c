//! Single-shot stage countdown timer.
//!
//! Emits one `Tick` per interval starting at zero elapsed time (10, 9, … 1
//! for a ten-second stage), then one `Finish`. `advance` returns at most one
//! event per call, so a tick and the finish never share a cycle; a late
//! caller catches up over the following calls.

use std::time::Duration;

/// Notification produced by [`StageTimer::advance`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    /// Whole seconds remaining when this tick was due.
    Tick {
        /// Seconds remaining, rounded up.
        seconds_remaining: u32,
    },
    /// The stage duration has elapsed.
    Finish,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerState {
    Idle,
    Running,
    Finished,
}

/// Countdown timer advanced by the game loop.
#[derive(Clone, Debug)]
pub struct StageTimer {
    total: Duration,
    interval: Duration,
    elapsed: Duration,
    ticks_emitted: u32,
    state: TimerState,
}

impl StageTimer {
    /// Creates an idle timer that ticks every `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            total: Duration::ZERO,
            interval: interval.max(Duration::from_millis(1)),
            elapsed: Duration::ZERO,
            ticks_emitted: 0,
            state: TimerState::Idle,
        }
    }

    /// Starts a countdown of `total`, cancelling any running one.
    pub fn start(&mut self, total: Duration) {
        if self.is_running() {
            tracing::debug!("Stage timer restarted with {:?} remaining", self.remaining());
        }
        self.total = total;
        self.elapsed = Duration::ZERO;
        self.ticks_emitted = 0;
        self.state = TimerState::Running;
    }

    /// Stops the timer without a `Finish` event.
    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
    }

    /// Advances by `dt` and returns the next due event, if any.
    pub fn advance(&mut self, dt: Duration) -> Option<TimerEvent> {
        if self.state != TimerState::Running {
            return None;
        }
        self.elapsed += dt;

        if self.ticks_emitted < self.tick_count() {
            let due = self.interval * self.ticks_emitted;
            if self.elapsed >= due {
                self.ticks_emitted += 1;
                return Some(TimerEvent::Tick {
                    seconds_remaining: ceil_secs(self.total.saturating_sub(due)),
                });
            }
            return None;
        }

        if self.elapsed >= self.total {
            self.state = TimerState::Finished;
            return Some(TimerEvent::Finish);
        }
        None
    }

    /// Time left, zero when not running.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        match self.state {
            TimerState::Running => self.total.saturating_sub(self.elapsed),
            TimerState::Idle | TimerState::Finished => Duration::ZERO,
        }
    }

    /// True between `start` and `Finish`/`cancel`.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// True after `Finish` was emitted.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == TimerState::Finished
    }

    fn tick_count(&self) -> u32 {
        let total = self.total.as_nanos();
        let interval = self.interval.as_nanos();
        u32::try_from(total.div_ceil(interval)).unwrap_or(u32::MAX)
    }
}

fn ceil_secs(duration: Duration) -> u32 {
    let secs = duration.as_secs() + u64::from(duration.subsec_nanos() > 0);
    u32::try_from(secs).unwrap_or(u32::MAX)
}
