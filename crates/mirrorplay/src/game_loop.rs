//! # Game Tick Loop
//!
//! Fixed-timestep driver for the game tick (~16 ms).
//!
//! ## Design
//!
//! The tick is a fixed-rate timer, not tied to display vsync:
//! - Wall-clock time is fed in (`advance`) and accumulated
//! - Whole ticks are drained with `should_tick` / `begin_tick`
//! - A long stall (window dragged, debugger) is not replayed in full;
//!   at most `max_catch_up` ticks run per advance and the rest is dropped

use std::time::{Duration, Instant};

/// Tick timing statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Total ticks executed.
    pub total_ticks: u64,
    /// Maximum tick duration observed.
    pub max_tick_us: u64,
    /// Average tick duration (rolling).
    pub avg_tick_us: u64,
    /// Ticks that took longer than the tick interval.
    pub late_ticks: u64,
    /// Ticks skipped because the loop fell too far behind.
    pub dropped_ticks: u64,
}

/// Fixed-timestep tick loop controller.
pub struct TickLoop {
    tick_duration: Duration,
    max_catch_up: u32,
    last_advance: Option<Instant>,
    accumulator: Duration,
    tick_count: u64,
    stats: TickStats,
}

impl TickLoop {
    /// Default limit of ticks run for one advance.
    pub const DEFAULT_MAX_CATCH_UP: u32 = 8;

    /// Creates a tick loop with the given interval.
    #[must_use]
    pub fn new(tick_duration: Duration) -> Self {
        Self {
            tick_duration: tick_duration.max(Duration::from_millis(1)),
            max_catch_up: Self::DEFAULT_MAX_CATCH_UP,
            last_advance: None,
            accumulator: Duration::ZERO,
            tick_count: 0,
            stats: TickStats::default(),
        }
    }

    /// Overrides the catch-up limit.
    #[must_use]
    pub fn with_max_catch_up(mut self, ticks: u32) -> Self {
        self.max_catch_up = ticks.max(1);
        self
    }

    /// Accumulates the wall-clock time since the previous call.
    ///
    /// The first call only sets the reference point.
    pub fn advance_to(&mut self, now: Instant) {
        if let Some(last) = self.last_advance {
            self.advance(now.saturating_duration_since(last));
        }
        self.last_advance = Some(now);
    }

    /// Accumulates `elapsed`, dropping whatever exceeds the catch-up limit.
    pub fn advance(&mut self, elapsed: Duration) {
        self.accumulator += elapsed;
        let limit = self.tick_duration * self.max_catch_up;
        if self.accumulator > limit {
            let excess = self.accumulator - limit;
            let dropped = u64::try_from(excess.as_nanos() / self.tick_duration.as_nanos())
                .unwrap_or(u64::MAX);
            self.stats.dropped_ticks = self.stats.dropped_ticks.saturating_add(dropped);
            tracing::debug!("Game loop fell behind, dropping {} tick(s)", dropped);
            self.accumulator = limit;
        }
    }

    /// Returns true if a whole tick is pending.
    #[must_use]
    pub fn should_tick(&self) -> bool {
        self.accumulator >= self.tick_duration
    }

    /// Consumes one pending tick.
    ///
    /// Returns the tick start time for duration measurement.
    #[must_use]
    pub fn begin_tick(&mut self) -> Instant {
        self.accumulator = self.accumulator.saturating_sub(self.tick_duration);
        self.tick_count += 1;
        Instant::now()
    }

    /// Marks the end of a tick.
    pub fn end_tick(&mut self, start: Instant) {
        let duration = start.elapsed();
        let duration_us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);

        self.stats.total_ticks += 1;
        self.stats.max_tick_us = self.stats.max_tick_us.max(duration_us);
        self.stats.avg_tick_us = (self.stats.avg_tick_us * 15 + duration_us) / 16;

        if duration > self.tick_duration {
            self.stats.late_ticks += 1;
        }
    }

    /// Time until the next tick is due.
    #[must_use]
    pub fn time_to_next_tick(&self) -> Duration {
        self.tick_duration.saturating_sub(self.accumulator)
    }

    /// Returns the current tick count.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Returns tick statistics.
    #[must_use]
    pub const fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Returns the target tick duration.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.tick_duration
    }
}

impl Default for TickLoop {
    fn default() -> Self {
        Self::new(mirrorplay_shared::constants::TICK_INTERVAL)
    }
}
