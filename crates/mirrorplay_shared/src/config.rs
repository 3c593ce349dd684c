//! # Game Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file (or no file at all) yields the stock tuning.
//!
//! ```toml
//! tick_interval_ms = 16
//! mask_threshold = 0.99
//!
//! [difficulty.hard]
//! min_velocity = 20.0
//! max_velocity = 30.0
//! spawn_interval_ms = 400
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BALL_RADIUS, MASK_THRESHOLD, POPUP_DURATION, POP_DURATION, TARGET_FLOOR_DENOMINATOR,
    TICK_INTERVAL, WATCHDOG_THRESHOLD,
};
use crate::error::{ConfigError, ConfigResult};
use crate::modes::Difficulty;

/// Spawn parameters derived from a difficulty preset.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    /// Lower bound of the initial fall velocity, pixels per tick.
    pub min_velocity: f32,
    /// Upper bound of the initial fall velocity, pixels per tick.
    pub max_velocity: f32,
    /// Time between spawns, milliseconds.
    pub spawn_interval_ms: u64,
}

impl DifficultyParams {
    /// Time between spawns.
    #[must_use]
    pub const fn spawn_interval(&self) -> Duration {
        Duration::from_millis(self.spawn_interval_ms)
    }
}

/// Tunable table of the three presets.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTable {
    /// Slow, rare balls.
    pub easy: DifficultyParams,
    /// Moderate.
    pub medium: DifficultyParams,
    /// Fast, frequent balls.
    pub hard: DifficultyParams,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self {
            easy: DifficultyParams { min_velocity: 2.0, max_velocity: 4.0, spawn_interval_ms: 1200 },
            medium: DifficultyParams { min_velocity: 5.0, max_velocity: 12.0, spawn_interval_ms: 700 },
            hard: DifficultyParams { min_velocity: 20.0, max_velocity: 30.0, spawn_interval_ms: 400 },
        }
    }
}

impl DifficultyTable {
    /// Parameters for a preset.
    #[must_use]
    pub const fn params(&self, difficulty: Difficulty) -> DifficultyParams {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }

    /// Checks ranges and Easy ≤ Medium ≤ Hard ordering in speed and frequency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violation.
    pub fn validate(&self) -> ConfigResult<()> {
        for (name, p) in [("easy", self.easy), ("medium", self.medium), ("hard", self.hard)] {
            if !(p.min_velocity.is_finite() && p.max_velocity.is_finite()) || p.min_velocity <= 0.0 {
                return Err(ConfigError::Invalid(format!("{name}: velocities must be positive")));
            }
            if p.min_velocity > p.max_velocity {
                return Err(ConfigError::Invalid(format!("{name}: min_velocity > max_velocity")));
            }
            if p.spawn_interval_ms == 0 {
                return Err(ConfigError::Invalid(format!("{name}: spawn_interval_ms must be > 0")));
            }
        }
        let ordered = |lo: DifficultyParams, hi: DifficultyParams| {
            lo.min_velocity <= hi.min_velocity
                && lo.max_velocity <= hi.max_velocity
                && lo.spawn_interval_ms >= hi.spawn_interval_ms
        };
        if !ordered(self.easy, self.medium) || !ordered(self.medium, self.hard) {
            return Err(ConfigError::Invalid(
                "difficulty presets must be monotonic (easy <= medium <= hard)".into(),
            ));
        }
        Ok(())
    }
}

/// Timings of the countdown and stage-over sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceTimings {
    /// "Get Ready!" fade-in.
    pub get_ready_fade_ms: u64,
    /// "Get Ready!" hold before the numbers start.
    pub get_ready_hold_ms: u64,
    /// Gap between 3, 2, 1 and Go.
    pub countdown_step_ms: u64,
    /// "Stage over!" fade-in and fade-out, each.
    pub stage_over_fade_ms: u64,
    /// "Stage over!" hold.
    pub stage_over_hold_ms: u64,
}

impl Default for SequenceTimings {
    fn default() -> Self {
        Self {
            get_ready_fade_ms: 1000,
            get_ready_hold_ms: 1500,
            countdown_step_ms: 1000,
            stage_over_fade_ms: 1000,
            stage_over_hold_ms: 2000,
        }
    }
}

impl SequenceTimings {
    /// Lead-in before the first countdown number.
    #[must_use]
    pub const fn lead_in(&self) -> Duration {
        Duration::from_millis(self.get_ready_fade_ms + self.get_ready_hold_ms)
    }

    /// Gap between countdown cues.
    #[must_use]
    pub const fn countdown_step(&self) -> Duration {
        Duration::from_millis(self.countdown_step_ms)
    }

    /// Total length of the stage-over message.
    #[must_use]
    pub const fn stage_over(&self) -> Duration {
        Duration::from_millis(2 * self.stage_over_fade_ms + self.stage_over_hold_ms)
    }
}

/// Automatic orientation tuning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoOrientationConfig {
    /// How often the latest mask is analysed.
    pub period_ms: u64,
    /// Minimum foreground pixels before a decision is made.
    pub min_lit_pixels: u32,
}

impl Default for AutoOrientationConfig {
    fn default() -> Self {
        Self { period_ms: 1000, min_lit_pixels: 300 }
    }
}

impl AutoOrientationConfig {
    /// Analysis period.
    #[must_use]
    pub const fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

/// Complete runtime tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Fixed game tick interval.
    pub tick_interval_ms: u64,
    /// Ball radius in view pixels.
    pub ball_radius: f32,
    /// Mask confidence threshold; `confidence >= threshold` is foreground.
    pub mask_threshold: f32,
    /// Pop animation length.
    pub pop_duration_ms: u64,
    /// Success popup display time.
    pub popup_duration_ms: u64,
    /// Frame liveness watchdog window.
    pub watchdog_threshold_ms: u64,
    /// At least `1/n` of spawned balls carry the target color.
    pub target_floor_denominator: u32,
    /// Popup bitmap size in view pixels (width, height).
    pub popup_size: (f32, f32),
    /// Difficulty presets.
    pub difficulty: DifficultyTable,
    /// Countdown and stage-over timings.
    pub sequence: SequenceTimings,
    /// Auto orientation tuning.
    pub auto_orientation: AutoOrientationConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: TICK_INTERVAL.as_millis() as u64,
            ball_radius: BALL_RADIUS,
            mask_threshold: MASK_THRESHOLD,
            pop_duration_ms: POP_DURATION.as_millis() as u64,
            popup_duration_ms: POPUP_DURATION.as_millis() as u64,
            watchdog_threshold_ms: WATCHDOG_THRESHOLD.as_millis() as u64,
            target_floor_denominator: TARGET_FLOOR_DENOMINATOR,
            popup_size: (240.0, 120.0),
            difficulty: DifficultyTable::default(),
            sequence: SequenceTimings::default(),
            auto_orientation: AutoOrientationConfig::default(),
        }
    }
}

impl GameConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns a parse error or the first failed invariant.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an I/O, parse or validation error.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every invariant the game loop relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violation.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be > 0".into()));
        }
        if !(self.mask_threshold > 0.0 && self.mask_threshold <= 1.0) {
            return Err(ConfigError::Invalid("mask_threshold must be in (0, 1]".into()));
        }
        if !(self.ball_radius.is_finite() && self.ball_radius > 0.0) {
            return Err(ConfigError::Invalid("ball_radius must be positive".into()));
        }
        if self.target_floor_denominator == 0 {
            return Err(ConfigError::Invalid("target_floor_denominator must be > 0".into()));
        }
        if self.pop_duration_ms == 0 {
            return Err(ConfigError::Invalid("pop_duration_ms must be > 0".into()));
        }
        self.difficulty.validate()
    }

    /// Game tick interval.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Pop animation length.
    #[must_use]
    pub const fn pop_duration(&self) -> Duration {
        Duration::from_millis(self.pop_duration_ms)
    }

    /// Popup display time.
    #[must_use]
    pub const fn popup_duration(&self) -> Duration {
        Duration::from_millis(self.popup_duration_ms)
    }

    /// Watchdog window.
    #[must_use]
    pub const fn watchdog_threshold(&self) -> Duration {
        Duration::from_millis(self.watchdog_threshold_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick_interval(), Duration::from_millis(16));
        assert_eq!(config.sequence.lead_in(), Duration::from_millis(2500));
        assert_eq!(config.sequence.stage_over(), Duration::from_millis(4000));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GameConfig::from_toml_str(
            r#"
mask_threshold = 0.5

[difficulty.hard]
min_velocity = 25.0
max_velocity = 40.0
spawn_interval_ms = 300
"#,
        )
        .unwrap();
        assert_eq!(config.mask_threshold, 0.5);
        assert_eq!(config.difficulty.hard.spawn_interval_ms, 300);
        assert_eq!(config.difficulty.easy.spawn_interval_ms, 1200);
        assert_eq!(config.ball_radius, 40.0);
    }

    #[test]
    fn test_non_monotonic_difficulty_rejected() {
        let mut table = DifficultyTable::default();
        table.easy.spawn_interval_ms = 100;
        assert!(matches!(table.validate(), Err(ConfigError::Invalid(_))));

        let mut table = DifficultyTable::default();
        table.medium.min_velocity = 50.0;
        table.medium.max_velocity = 60.0;
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        assert!(GameConfig::from_toml_str("mask_threshold = 1.5").is_err());
        assert!(GameConfig::from_toml_str("tick_interval_ms = 0").is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = GameConfig::from_file("/nonexistent/mirrorplay.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/mirrorplay.toml"));
    }
}
