//! # Frame Liveness Watchdog
//!
//! Purely observational: it logs when the camera goes quiet and when it
//! comes back, and never changes what gets rendered.
//!
//! ```text
//!   record ─ record ─ record ───────────── 3 s ──► WARN (once) ─ record ─► INFO recovered
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Result of a liveness check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WatchdogStatus {
    /// A frame arrived within the threshold.
    Live,
    /// No frame for longer than the threshold. `newly` is true only on the
    /// first check of a stall episode.
    Stalled {
        /// Time since the last frame (or since the watchdog started).
        silent_for: Duration,
        /// First report of this episode.
        newly: bool,
    },
}

/// Tracks the time of the last bridged frame.
///
/// Timestamps are stored as nanoseconds since the watchdog's own epoch, so
/// `record_frame` and `check` may run on different threads without a lock.
#[derive(Debug)]
pub struct FrameWatchdog {
    epoch: Instant,
    threshold: Duration,
    last_frame_nanos: AtomicU64,
    stalled: AtomicBool,
}

impl FrameWatchdog {
    /// Starts the watchdog now.
    #[must_use]
    pub fn new(threshold: Duration) -> Self {
        Self::starting_at(threshold, Instant::now())
    }

    /// Starts the watchdog at a given instant. The start counts as the
    /// last-seen frame, so a source that never delivers is still reported.
    #[must_use]
    pub fn starting_at(threshold: Duration, epoch: Instant) -> Self {
        Self {
            epoch,
            threshold,
            last_frame_nanos: AtomicU64::new(0),
            stalled: AtomicBool::new(false),
        }
    }

    /// Stall threshold.
    #[must_use]
    pub const fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Notes that a frame was bridged at `now`.
    pub fn record_frame(&self, now: Instant) {
        let nanos = now.saturating_duration_since(self.epoch).as_nanos();
        self.last_frame_nanos
            .fetch_max(u64::try_from(nanos).unwrap_or(u64::MAX), Ordering::Relaxed);
        if self.stalled.swap(false, Ordering::Relaxed) {
            tracing::info!("Camera frames resumed");
        }
    }

    /// Checks liveness at `now`, logging a warning once per stall episode.
    pub fn check(&self, now: Instant) -> WatchdogStatus {
        let last = self.epoch + Duration::from_nanos(self.last_frame_nanos.load(Ordering::Relaxed));
        let silent_for = now.saturating_duration_since(last);
        if silent_for <= self.threshold {
            return WatchdogStatus::Live;
        }
        let newly = !self.stalled.swap(true, Ordering::Relaxed);
        if newly {
            tracing::warn!(
                "No camera frame bridged for {} ms (threshold {} ms)",
                silent_for.as_millis(),
                self.threshold.as_millis()
            );
        }
        WatchdogStatus::Stalled { silent_for, newly }
    }

    /// Whether the last check reported a stall that has not recovered.
    #[must_use]
    pub fn is_stalled(&self) -> bool {
        self.stalled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_within_threshold() {
        let t0 = Instant::now();
        let dog = FrameWatchdog::starting_at(Duration::from_secs(3), t0);
        dog.record_frame(t0 + Duration::from_secs(1));
        assert_eq!(dog.check(t0 + Duration::from_secs(4)), WatchdogStatus::Live);
    }

    #[test]
    fn test_stall_reported_once_then_recovers() {
        let t0 = Instant::now();
        let dog = FrameWatchdog::starting_at(Duration::from_secs(3), t0);

        let first = dog.check(t0 + Duration::from_millis(3001));
        assert!(matches!(first, WatchdogStatus::Stalled { newly: true, .. }));
        let second = dog.check(t0 + Duration::from_secs(5));
        assert_eq!(
            second,
            WatchdogStatus::Stalled { silent_for: Duration::from_secs(5), newly: false }
        );
        assert!(dog.is_stalled());

        dog.record_frame(t0 + Duration::from_secs(6));
        assert!(!dog.is_stalled());
        assert_eq!(dog.check(t0 + Duration::from_secs(7)), WatchdogStatus::Live);
    }

    #[test]
    fn test_out_of_order_record_keeps_latest() {
        let t0 = Instant::now();
        let dog = FrameWatchdog::starting_at(Duration::from_secs(3), t0);
        dog.record_frame(t0 + Duration::from_secs(5));
        dog.record_frame(t0 + Duration::from_secs(1));
        assert_eq!(dog.check(t0 + Duration::from_secs(7)), WatchdogStatus::Live);
    }
}
