//! # Gameplay
//!
//! Balls, their spawn policy, the pop animation and the interaction engine
//! that ties them to touches and to the body mask.

pub mod animation;
pub mod ball;
pub mod engine;
pub mod popup;
pub mod spawn;

pub use animation::{Easing, PopAnimation};
pub use ball::{Ball, BallId, PairId};
pub use engine::{BallTap, InteractionEngine, TapSource};
pub use popup::{place_popup, PopupImage};
pub use spawn::{SpawnLayout, SpawnPolicy, Spawned};
