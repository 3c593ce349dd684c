//! Stage sequencing: the timer, the countdown and stage-over sequences,
//! and the state machine that drives them.

pub mod orchestrator;
pub mod sequence;
pub mod timer;

pub use orchestrator::{StageOrchestrator, StagePhase, StageStats};
pub use sequence::{CountdownCue, CountdownSequence, StageOverPhase, StageOverSequence};
pub use timer::{StageTimer, TimerEvent};
