//! The fixed ball palette.

use serde::{Deserialize, Serialize};

/// Colors a ball can take. Exactly one is the stage target.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallColor {
    /// Pure red.
    Red = 0,
    /// Pure blue.
    Blue = 1,
    /// Yellow.
    Yellow = 2,
    /// Pure green.
    Green = 3,
    /// Magenta, shown to the user as "PINK".
    Pink = 4,
}

impl BallColor {
    /// Every palette entry, in a fixed order.
    pub const ALL: [Self; 5] = [Self::Red, Self::Blue, Self::Yellow, Self::Green, Self::Pink];

    /// sRGB components in `0..=255`.
    #[must_use]
    pub const fn rgb(self) -> [u8; 3] {
        match self {
            Self::Red => [255, 0, 0],
            Self::Blue => [0, 0, 255],
            Self::Yellow => [255, 255, 0],
            Self::Green => [0, 255, 0],
            Self::Pink => [255, 0, 255],
        }
    }

    /// Rim color of the ball gradient: each channel scaled by `factor`.
    #[must_use]
    pub fn darkened(self, factor: f32) -> [u8; 3] {
        let factor = factor.clamp(0.0, 1.0);
        self.rgb().map(|c| (f32::from(c) * factor) as u8)
    }

    /// Normalised RGBA for GPU upload.
    #[must_use]
    pub fn rgba_f32(self) -> [f32; 4] {
        let [r, g, b] = self.rgb();
        [f32::from(r) / 255.0, f32::from(g) / 255.0, f32::from(b) / 255.0, 1.0]
    }

    /// Upper-case display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "RED",
            Self::Blue => "BLUE",
            Self::Yellow => "YELLOW",
            Self::Green => "GREEN",
            Self::Pink => "PINK",
        }
    }

    /// Prompt shown while this color is the target.
    #[must_use]
    pub fn target_prompt(self) -> String {
        format!("Catch the {} ball!", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_darkened_rim() {
        assert_eq!(BallColor::Red.darkened(0.7), [178, 0, 0]);
        assert_eq!(BallColor::Yellow.darkened(0.7), [178, 178, 0]);
    }

    #[test]
    fn test_target_prompt() {
        assert_eq!(BallColor::Pink.target_prompt(), "Catch the PINK ball!");
    }
}
