//! # Cross-Thread Hand-off
//!
//! ```text
//! Camera context:   on_frame(A)  on_frame(B)            on_frame(C)
//! Render context:                            take → B                take → C
//!                                  (A superseded, never uploaded)
//! ```
//!
//! One slot, one flag. The render thread never waits on the camera and the
//! camera never waits on the render thread; the price is that intermediate
//! frames are dropped, which is exactly what a live preview wants.

mod frame_bridge;
mod tunables;

pub use frame_bridge::{BridgeStats, FrameBridge};
pub use tunables::SharedTunables;
