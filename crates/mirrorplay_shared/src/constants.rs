//! # Gameplay Constants
//!
//! Defaults baked into the binary. Everything tunable at runtime lives in
//! [`GameConfig`](crate::GameConfig); these are its fallback values.

use std::time::Duration;

// =============================================================================
// TIMING
// =============================================================================

/// Interval of the fixed-rate game tick (~60 Hz).
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Duration of the pop animation (1.0 → 1.5 → 0.0).
pub const POP_DURATION: Duration = Duration::from_millis(300);

/// How long a success popup stays on screen.
pub const POPUP_DURATION: Duration = Duration::from_millis(1000);

/// A bridged frame older than this triggers a watchdog warning.
pub const WATCHDOG_THRESHOLD: Duration = Duration::from_secs(3);

/// Period of the stage timer's tick notifications.
pub const STAGE_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Default stage length in seconds.
pub const DEFAULT_STAGE_SECS: u32 = 10;

/// Longest stage a stored preference may ask for.
pub const MAX_STAGE_SECS: u32 = 3600;

/// Default music and sound volume, `0..=100`.
pub const DEFAULT_VOLUME: u8 = 50;

/// Largest stored target offset, in view pixels.
pub const MAX_TARGET_OFFSET: u32 = 4096;

// =============================================================================
// GAMEPLAY
// =============================================================================

/// Radius of every ball, in view pixels.
pub const BALL_RADIUS: f32 = 40.0;

/// Confidence at or above which a mask pixel counts as foreground.
pub const MASK_THRESHOLD: f32 = 0.99;

/// At least `1 / TARGET_FLOOR_DENOMINATOR` of spawned balls carry the target color.
pub const TARGET_FLOOR_DENOMINATOR: u32 = 3;

/// Number of success cues (terrific, wow, great, amazing).
pub const SUCCESS_CUE_COUNT: usize = 4;

/// Names of the success cues, indexed by cue index.
pub const SUCCESS_CUES: [&str; SUCCESS_CUE_COUNT] = ["terrific", "wow", "great", "amazing"];

/// First number of the 3-2-1 countdown.
pub const COUNTDOWN_FROM: u8 = 3;

// =============================================================================
// CAPTURE
// =============================================================================

/// Resolution requested for the mirror preview stream.
pub const PREVIEW_RESOLUTION: (u32, u32) = (1920, 1080);

/// Resolution requested for the segmentation analysis stream.
pub const ANALYSIS_RESOLUTION: (u32, u32) = (640, 480);
