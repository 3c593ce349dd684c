//! # MIRRORPLAY Core
//!
//! Everything that crosses a thread boundary on its way from the camera to
//! the screen.
//!
//! ```text
//!   Camera thread                         Render thread (vsync)
//!   ─────────────                         ─────────────────────
//!   FrameBridge::on_frame(frame) ──┐
//!                                  │  dirty flag (AtomicBool)
//!                                  └────► FrameBridge::take_pending()
//!                                              │
//!   UI thread                                  ▼
//!   ─────────                           upload + draw
//!   SharedTunables::set_mirror_mode ──► SharedTunables::mirror_mode()
//! ```
//!
//! ## Architecture Rules
//!
//! 1. **Latest wins** - a newer frame always replaces an unconsumed one
//! 2. **Never block the camera** - `on_frame` only swaps a slot and a flag
//! 3. **Stale is fine** - readers may see a one-frame-old tunable

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod frame;
pub mod sync;
pub mod watchdog;

pub use error::{FrameError, FrameResult};
pub use frame::{Frame, PixelFormat};
pub use sync::{BridgeStats, FrameBridge, SharedTunables};
pub use watchdog::{FrameWatchdog, WatchdogStatus};
