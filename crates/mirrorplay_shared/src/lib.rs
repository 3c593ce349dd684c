//! # MIRRORPLAY Shared
//!
//! Common types used by the game loop, the segmentation worker and the
//! renderer.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - `wgpu`
//! - Any GPU or window-related crate
//!
//! If you need graphics types, put them in `mirrorplay_rendering`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod error;
pub mod math;
pub mod modes;
pub mod palette;
pub mod settings;

pub use config::{AutoOrientationConfig, DifficultyParams, DifficultyTable, GameConfig, SequenceTimings};
pub use error::{ConfigError, ConfigResult};
pub use math::Vec2;
pub use modes::{Difficulty, MirrorMode, Orientation, Rotation};
pub use palette::BallColor;
pub use settings::{StageSettings, UserProfile};
