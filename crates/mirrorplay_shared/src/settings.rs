//! Per-user stage preferences and the persisted profile record.
//!
//! Stored values are read leniently: a number out of range, or a value of
//! the wrong type, falls back to the field's default. Only text that is not
//! TOML at all fails to load.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::{DEFAULT_STAGE_SECS, DEFAULT_VOLUME, MAX_STAGE_SECS, MAX_TARGET_OFFSET};
use crate::modes::{Difficulty, Orientation};

/// Preferences read at stage start and on every change notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    /// Mirror orientation preference.
    pub orientation: Orientation,
    /// Difficulty preset.
    pub difficulty: Difficulty,
    /// Length of one stage in seconds, `1..=MAX_STAGE_SECS`.
    #[serde(deserialize_with = "stage_secs")]
    pub stage_duration_secs: u32,
    /// Background music volume, `0..=100`.
    #[serde(deserialize_with = "volume")]
    pub music_volume: u8,
    /// Sound effect volume, `0..=100`.
    #[serde(deserialize_with = "volume")]
    pub sound_volume: u8,
    /// Whether the segmentation silhouette is drawn over the feed.
    #[serde(deserialize_with = "flag")]
    pub segmentation_visible: bool,
    /// Horizontal distance between a ball and its mirrored twin's axis, in view pixels.
    #[serde(deserialize_with = "target_offset")]
    pub target_offset: u32,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            orientation: Orientation::RightMirrored,
            difficulty: Difficulty::Medium,
            stage_duration_secs: DEFAULT_STAGE_SECS,
            music_volume: DEFAULT_VOLUME,
            sound_volume: DEFAULT_VOLUME,
            segmentation_visible: false,
            target_offset: 0,
        }
    }
}

impl StageSettings {
    /// Music volume scaled to `0.0..=1.0`.
    #[must_use]
    pub fn music_gain(&self) -> f32 {
        f32::from(self.music_volume.min(100)) / 100.0
    }

    /// Sound effect volume scaled to `0.0..=1.0`.
    #[must_use]
    pub fn sound_gain(&self) -> f32 {
        f32::from(self.sound_volume.min(100)) / 100.0
    }
}

/// A stored user profile: identity, best score and preferences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name. Empty when the stored file has none.
    #[serde(default)]
    pub name: String,
    /// Highest success count reached in a single stage.
    #[serde(default, deserialize_with = "record")]
    pub record: u32,
    /// Stage preferences.
    #[serde(default)]
    pub settings: StageSettings,
}

impl UserProfile {
    /// Creates a profile with default settings and no record.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record: 0,
            settings: StageSettings::default(),
        }
    }
}

// =============================================================================
// Lenient field readers
// =============================================================================

/// Any stored value; only integers (and whole floats) are kept.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseNumber {
    Int(i64),
    Float(f64),
    Other(IgnoredAny),
}

impl LooseNumber {
    fn within(self, min: i64, max: i64) -> Option<i64> {
        let value = match self {
            Self::Int(v) => v,
            Self::Float(f) if f.is_finite() && f.fract() == 0.0 => f as i64,
            Self::Float(_) | Self::Other(_) => return None,
        };
        (min..=max).contains(&value).then_some(value)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseFlag {
    Bool(bool),
    Other(IgnoredAny),
}

fn loose_u32<'de, D: Deserializer<'de>>(
    d: D,
    min: u32,
    max: u32,
    fallback: u32,
) -> Result<u32, D::Error> {
    Ok(LooseNumber::deserialize(d)?
        .within(i64::from(min), i64::from(max))
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(fallback))
}

fn stage_secs<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    loose_u32(d, 1, MAX_STAGE_SECS, DEFAULT_STAGE_SECS)
}

fn target_offset<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    loose_u32(d, 0, MAX_TARGET_OFFSET, 0)
}

fn record<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    loose_u32(d, 0, u32::MAX, 0)
}

fn volume<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    Ok(LooseNumber::deserialize(d)?
        .within(0, 100)
        .and_then(|v| u8::try_from(v).ok())
        .unwrap_or(DEFAULT_VOLUME))
}

fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match LooseFlag::deserialize(d)? {
        LooseFlag::Bool(b) => b,
        LooseFlag::Other(_) => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_toml_roundtrip_with_lenient_strings() {
        let text = r#"
name = "ana"
record = 7

[settings]
orientation = "Left Mirrored"
difficulty = "impossible"
stage_duration_secs = 30
"#;
        let profile: UserProfile = toml::from_str(text).unwrap();
        assert_eq!(profile.record, 7);
        assert_eq!(profile.settings.orientation, Orientation::LeftMirrored);
        assert_eq!(profile.settings.difficulty, Difficulty::Medium);
        assert_eq!(profile.settings.stage_duration_secs, 30);
        assert_eq!(profile.settings.music_volume, 50);

        let encoded = toml::to_string(&profile).unwrap();
        assert!(encoded.contains("Left Mirrored"));
    }

    #[test]
    fn test_gains_clamp() {
        let settings = StageSettings { music_volume: 250, sound_volume: 25, ..Default::default() };
        assert_eq!(settings.music_gain(), 1.0);
        assert_eq!(settings.sound_gain(), 0.25);
    }

    #[test]
    fn test_out_of_range_values_fall_back_to_defaults() {
        let text = r#"
name = "ana"
record = -3

[settings]
stage_duration_secs = -5
music_volume = 300
sound_volume = "loud"
segmentation_visible = "yes"
target_offset = 12.5
"#;
        let profile: UserProfile = toml::from_str(text).unwrap();
        assert_eq!(profile.record, 0);
        assert_eq!(profile.settings, StageSettings::default());
    }

    #[test]
    fn test_in_range_values_are_kept() {
        let text = r#"
name = "ana"
record = 9

[settings]
stage_duration_secs = 45
music_volume = 100
sound_volume = 0
segmentation_visible = true
target_offset = 120
"#;
        let profile: UserProfile = toml::from_str(text).unwrap();
        assert_eq!(profile.record, 9);
        assert_eq!(profile.settings.stage_duration_secs, 45);
        assert_eq!(profile.settings.music_volume, 100);
        assert_eq!(profile.settings.sound_volume, 0);
        assert!(profile.settings.segmentation_visible);
        assert_eq!(profile.settings.target_offset, 120);
    }

    #[test]
    fn test_zero_stage_duration_uses_default() {
        let profile: UserProfile =
            toml::from_str("name = \"a\"\n[settings]\nstage_duration_secs = 0\n").unwrap();
        assert_eq!(profile.settings.stage_duration_secs, DEFAULT_STAGE_SECS);
    }
}
