//! # MIRRORPLAY Event System
//!
//! Game core to presentation layer notifications.
//!
//! ```text
//! ┌──────────────────┐      ┌─────────────┐      ┌──────────────────┐
//! │ StageOrchestrator│─────>│  UiEvent    │─────>│  Presentation    │
//! │ GameSession      │      │  Channel    │      │  (text, sounds,  │
//! └──────────────────┘      └─────────────┘      │   haptics)       │
//!                                                └──────────────────┘
//! ```
//!
//! The channel is bounded and never blocks the game tick: when the
//! presentation layer falls behind, new events are dropped and logged.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use mirrorplay_shared::{BallColor, MirrorMode};

use crate::stage::StagePhase;

/// Events the core emits for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    // =========================================================================
    // Sequence
    // =========================================================================
    /// The stage state machine entered a new phase.
    SequencePhase(StagePhase),

    /// "Get Ready!" is shown.
    GetReady,

    /// The target prompt is shown, along with the first countdown number.
    TargetAnnounced {
        /// Stage target color.
        color: BallColor,
        /// "Catch the {NAME} ball!"
        prompt: String,
    },

    /// A countdown number with its sound cue.
    Countdown {
        /// 3, 2 or 1.
        value: u8,
    },

    /// "Go!" with the go sound. Spawning starts now.
    Go,

    // =========================================================================
    // Play
    // =========================================================================
    /// A ball was caught by touch or by the body mask.
    BallTapped {
        /// Color of the caught ball.
        color: BallColor,
        /// True when it matched the stage target.
        was_target_match: bool,
    },

    /// A target ball was caught: play the cue sound and show its popup.
    Success {
        /// Index into the success cues, shared by sound and popup.
        cue: usize,
        /// Success count so far this stage.
        successes: u32,
    },

    /// A non-target ball was caught: play the miss sound and vibrate.
    Miss {
        /// Miss count so far this stage.
        misses: u32,
    },

    /// Once per second while the stage runs.
    StageTick {
        /// Whole seconds remaining.
        seconds_remaining: u32,
    },

    // =========================================================================
    // Stage end
    // =========================================================================
    /// The stage timer ran out.
    StageEnded {
        /// Successes in the finished stage.
        final_success_count: u32,
        /// True when this beat the stored record.
        new_record: bool,
    },

    // =========================================================================
    // Display
    // =========================================================================
    /// The mirror mode changed (settings or auto orientation).
    MirrorModeChanged(MirrorMode),
}

/// Bounded channel of [`UiEvent`]s.
pub struct EventBus {
    sender: Sender<UiEvent>,
    receiver: Receiver<UiEvent>,
}

impl EventBus {
    /// Default number of events in flight.
    pub const DEFAULT_CAPACITY: usize = 256;

    /// Creates a new event bus.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum events in flight before new ones are dropped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self { sender, receiver }
    }

    /// Creates a sender handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender { sender: self.sender.clone() }
    }

    /// Creates a receiver handle.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver { receiver: self.receiver.clone() }
    }

    /// Creates a new pair of sender and receiver.
    #[must_use]
    pub fn create_pair(capacity: usize) -> (EventSender, EventReceiver) {
        let bus = Self::new(capacity);
        (bus.sender(), bus.receiver())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<UiEvent>,
}

impl EventSender {
    /// Sends an event (non-blocking).
    ///
    /// Returns `false` if the event was dropped.
    #[inline]
    pub fn send(&self, event: UiEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!("UI event channel full, dropping {:?}", event);
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<UiEvent>,
}

impl EventReceiver {
    /// Receives all pending events (non-blocking).
    #[inline]
    pub fn drain(&self) -> Vec<UiEvent> {
        self.receiver.try_iter().collect()
    }

    /// Receives one event (non-blocking).
    #[inline]
    pub fn try_recv(&self) -> Option<UiEvent> {
        self.receiver.try_recv().ok()
    }

    /// Returns the number of pending events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Checks if there are pending events.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}
