//! # MIRRORPLAY
//!
//! Camera mirror therapy game: the user sees a mirrored live feed of
//! themselves and catches falling balls of a target color, either by
//! touching them or by covering them with their body.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                              MIRRORPLAY                              │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │                                                                      │
//! │  camera thread        segmentation thread        render context     │
//! │  ┌────────────┐       ┌──────────────────┐       ┌───────────────┐  │
//! │  │ FrameBridge│──────>│SegmentationWorker│       │MirrorRenderer │  │
//! │  │ on_frame   │       │ latest-wins      │       │OverlayRenderer│  │
//! │  └─────┬──────┘       └────────┬─────────┘       └───────▲───────┘  │
//! │        │ take_pending          │ HitMask                 │          │
//! │        └───────────────────────┼─────────────────────────┤          │
//! │                                ▼                         │          │
//! │                  game context (this crate)               │          │
//! │        ┌──────────────────────────────────────────┐      │          │
//! │        │ GameSession                              │      │          │
//! │        │  ├─ TickLoop (16 ms)                     │──────┘          │
//! │        │  ├─ InteractionEngine (balls, popups)    │ snapshot        │
//! │        │  └─ StageOrchestrator (phases, timer)    │                 │
//! │        └───────────────────┬──────────────────────┘                 │
//! │                            │ UiEvent                                 │
//! │                            ▼                                         │
//! │                    presentation layer                                │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `gameplay`: balls, spawn policy, pop animation, interaction engine
//! - `stage`: stage timer, countdown and stage-over sequences, orchestrator
//! - `game_loop`: fixed-timestep tick driver
//! - `events`: core to presentation notifications
//! - `profile`: record and preference persistence
//! - `session`: composition of the above for one screen

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod events;
pub mod game_loop;
pub mod gameplay;
pub mod profile;
pub mod session;
pub mod stage;

// Re-export the building blocks
pub use mirrorplay_core as core;
pub use mirrorplay_shared as shared;
pub use mirrorplay_vision as vision;

#[cfg(feature = "client")]
pub use mirrorplay_rendering as rendering;

// Re-export commonly used types
pub use error::{SessionError, SessionResult};
pub use events::{EventBus, EventReceiver, EventSender, UiEvent};
pub use game_loop::{TickLoop, TickStats};
pub use gameplay::{Ball, BallId, BallTap, InteractionEngine, PairId, PopupImage, SpawnPolicy, TapSource};
pub use profile::{MemoryProfileStore, ProfileStore, TomlProfileStore};
pub use session::GameSession;
pub use stage::{StageOrchestrator, StagePhase, StageStats, StageTimer, TimerEvent};
