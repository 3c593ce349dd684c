//! Display and difficulty modes.
//!
//! Setting strings come from user preferences and are parsed leniently:
//! anything unrecognised falls back to a documented default instead of
//! failing.

use serde::{Deserialize, Serialize};

/// Which half of the camera view is reflected onto the other.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MirrorMode {
    /// No reflection.
    #[default]
    Full = 0,
    /// The left half is the source; the right half shows its reflection.
    MirrorLeft = 1,
    /// The right half is the source; the left half shows its reflection.
    MirrorRight = 2,
}

impl MirrorMode {
    /// Decodes the wire value used by atomics and shader uniforms.
    ///
    /// Unknown values decode to `Full`.
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::MirrorLeft,
            2 => Self::MirrorRight,
            _ => Self::Full,
        }
    }

    /// Encodes to the wire value.
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Signed horizontal offset applied to the interactive ball.
    #[must_use]
    pub fn signed_offset(self, offset: f32) -> f32 {
        match self {
            Self::Full => 0.0,
            Self::MirrorLeft => -offset,
            Self::MirrorRight => offset,
        }
    }
}

/// Stored orientation preference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Orientation {
    /// Always `MirrorMode::Full`.
    Full,
    /// Always `MirrorMode::MirrorLeft`.
    LeftMirrored,
    /// Always `MirrorMode::MirrorRight`.
    #[default]
    RightMirrored,
    /// Mode follows the user's silhouette (see `mirrorplay_vision::orientation`).
    Auto,
}

impl Orientation {
    /// Parses a preference string. Unknown strings map to `Full`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "left mirrored" | "left" => Self::LeftMirrored,
            "right mirrored" | "right" => Self::RightMirrored,
            "auto" => Self::Auto,
            _ => Self::Full,
        }
    }

    /// Preference string as stored in the profile.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "Full",
            Self::LeftMirrored => "Left Mirrored",
            Self::RightMirrored => "Right Mirrored",
            Self::Auto => "Auto",
        }
    }

    /// Mirror mode to apply when this orientation is selected.
    ///
    /// `Auto` starts in `Full` until the first analysis decides.
    #[must_use]
    pub const fn initial_mirror_mode(self) -> MirrorMode {
        match self {
            Self::Full | Self::Auto => MirrorMode::Full,
            Self::LeftMirrored => MirrorMode::MirrorLeft,
            Self::RightMirrored => MirrorMode::MirrorRight,
        }
    }
}

impl From<String> for Orientation {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Orientation> for String {
    fn from(value: Orientation) -> Self {
        value.as_str().to_owned()
    }
}

/// Difficulty preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    /// Slow, rare balls.
    Easy,
    /// Moderate.
    #[default]
    Medium,
    /// Fast, frequent balls.
    Hard,
}

impl Difficulty {
    /// Parses a preference string, case-insensitive. Unknown strings map to `Medium`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Self::Easy,
            "hard" => Self::Hard,
            _ => Self::Medium,
        }
    }

    /// Preference string as stored in the profile.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Difficulty> for String {
    fn from(value: Difficulty) -> Self {
        value.as_str().to_owned()
    }
}

/// Clockwise rotation of a captured frame relative to the display.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rotation {
    /// Upright.
    #[default]
    Deg0 = 0,
    /// Quarter turn.
    Deg90 = 1,
    /// Half turn.
    Deg180 = 2,
    /// Three quarter turns.
    Deg270 = 3,
}

impl Rotation {
    /// Converts from degrees, snapping to the nearest quarter turn.
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Self {
        let quarters = ((f64::from(degrees) / 90.0).round() as i64).rem_euclid(4);
        match quarters {
            1 => Self::Deg90,
            2 => Self::Deg180,
            3 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Number of clockwise quarter turns.
    #[must_use]
    pub const fn quarter_turns(self) -> u32 {
        self as u32
    }
}
