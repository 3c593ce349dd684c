//! Pop animation played when a ball is caught.
//!
//! The scale runs through three keyframes, `1.0 → 1.5 → 0.0`, over a fixed
//! duration. Progress is eased before the keyframes are interpolated, so the
//! ball swells slowly, peaks, and collapses quickly at the end.

use std::time::Duration;

/// Scale keyframes, evenly spaced in eased time.
pub const POP_KEYFRAMES: [f32; 3] = [1.0, 1.5, 0.0];

/// Easing function type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Linear interpolation.
    Linear,
    /// Slow start and end, fast middle: `cos((t + 1)π) / 2 + 0.5`.
    #[default]
    AccelerateDecelerate,
}

impl Easing {
    /// Applies the easing function to a t value (0-1).
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::AccelerateDecelerate => ((t + 1.0) * std::f32::consts::PI).cos() / 2.0 + 0.5,
        }
    }
}

/// Interpolates evenly spaced keyframes at fraction `f` in `[0, 1]`.
fn keyframe_value(keyframes: &[f32], f: f32) -> f32 {
    match keyframes {
        [] => 1.0,
        [only] => *only,
        _ => {
            let segments = (keyframes.len() - 1) as f32;
            let scaled = f.clamp(0.0, 1.0) * segments;
            let index = (scaled.floor() as usize).min(keyframes.len() - 2);
            let local = scaled - index as f32;
            keyframes[index] + (keyframes[index + 1] - keyframes[index]) * local
        }
    }
}

/// A running pop animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopAnimation {
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
}

impl PopAnimation {
    /// Starts a pop animation of the given length.
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            elapsed: Duration::ZERO,
            duration,
            easing: Easing::default(),
        }
    }

    /// Overrides the easing curve.
    #[must_use]
    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Advances the animation. Returns true once it has completed.
    pub fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.is_complete()
    }

    /// Linear progress in `[0, 1]`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Current scale factor.
    #[must_use]
    pub fn scale(&self) -> f32 {
        keyframe_value(&POP_KEYFRAMES, self.easing.apply(self.progress()))
    }

    /// True when the animation has reached its last keyframe.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }
}
