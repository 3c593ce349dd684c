//! Latest-wins frame slot between the camera and the render thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::frame::Frame;

/// Counters describing bridge traffic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BridgeStats {
    /// Frames pushed by the source.
    pub received: u64,
    /// Frames replaced before the render thread consumed them.
    pub superseded: u64,
    /// Frames handed to the render thread.
    pub consumed: u64,
}

/// Depth-1 frame queue with a consumable "new frame available" flag.
///
/// `on_frame` may be called from any thread; `take_pending` is meant for
/// the render thread only. The payload lock is held just long enough to
/// swap an `Option<Frame>`.
///
/// ## Usage
///
/// ```rust,ignore
/// let bridge = Arc::new(FrameBridge::new());
///
/// // camera thread
/// bridge.on_frame(frame);
///
/// // render thread, once per vsync
/// if let Some(frame) = bridge.take_pending() {
///     texture.upload(&frame);
/// }
/// ```
#[derive(Debug, Default)]
pub struct FrameBridge {
    slot: Mutex<Option<Frame>>,
    dirty: AtomicBool,
    received: AtomicU64,
    superseded: AtomicU64,
    consumed: AtomicU64,
}

impl FrameBridge {
    /// Creates an empty bridge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes a frame, replacing any frame not yet consumed.
    pub fn on_frame(&self, frame: Frame) {
        self.received.fetch_add(1, Ordering::Relaxed);
        let previous = self.slot.lock().replace(frame);
        if previous.is_some() {
            let dropped = self.superseded.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::trace!("Frame superseded before upload (total dropped: {})", dropped);
        }
        self.dirty.store(true, Ordering::Release);
    }

    /// Whether a frame is waiting to be uploaded.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Clears the pending flag and returns the newest frame, if any.
    ///
    /// Returns `None` when nothing new arrived since the last call, in which
    /// case the caller keeps showing what it already uploaded.
    pub fn take_pending(&self) -> Option<Frame> {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return None;
        }
        let frame = self.slot.lock().take();
        if frame.is_some() {
            self.consumed.fetch_add(1, Ordering::Relaxed);
        }
        frame
    }

    /// Snapshot of the traffic counters.
    #[must_use]
    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            received: self.received.load(Ordering::Relaxed),
            superseded: self.superseded.load(Ordering::Relaxed),
            consumed: self.consumed.load(Ordering::Relaxed),
        }
    }
}
