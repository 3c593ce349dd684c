//! # Segmentation Worker
//!
//! One dedicated thread, one frame in flight. Both directions use a
//! bounded(1) channel with evict-oldest on the sending side:
//!
//! ```text
//!   submit(F1) submit(F2) submit(F3)          worker: analyze(F1) ... analyze(F3)
//!       │          │          │                         (F2 evicted, never analysed)
//!       ▼          ▼          ▼
//!    [ F1 ] ──► [ F2 ] ──► [ F3 ]   job slot
//! ```
//!
//! Results carry the sequence number of their frame; `drain_latest` hands
//! the game loop only the newest one and never goes backwards.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use mirrorplay_core::Frame;

use crate::engine::SegmentationEngine;
use crate::error::{VisionError, VisionResult};
use crate::mask::HitMask;

struct Job {
    sequence: u64,
    frame: Frame,
}

/// Result of analysing one frame.
#[derive(Clone, Debug)]
pub struct AnalysisOutcome {
    /// Submission order of the analysed frame, starting at 1.
    pub sequence: u64,
    /// Capture timestamp of the analysed frame.
    pub timestamp: Duration,
    /// Thresholded mask, or `None` if the engine failed on this frame.
    pub mask: Option<HitMask>,
}

/// Traffic counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Frames handed to `submit`.
    pub submitted: u64,
    /// Frames dropped from the job slot before analysis.
    pub evicted: u64,
    /// Frames the engine processed, successfully or not.
    pub analyzed: u64,
    /// Frames the engine failed on.
    pub failed: u64,
    /// Results dropped because a newer one was already delivered or queued.
    pub stale_results: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    evicted: AtomicU64,
    analyzed: AtomicU64,
    failed: AtomicU64,
    stale_results: AtomicU64,
}

/// Owns the segmentation thread.
///
/// Dropping the worker closes the job channel and joins the thread; an
/// analysis already running finishes first.
pub struct SegmentationWorker {
    job_tx: Option<Sender<Job>>,
    job_evict: Receiver<Job>,
    result_rx: Receiver<AnalysisOutcome>,
    handle: Option<JoinHandle<()>>,
    counters: Arc<Counters>,
    next_sequence: u64,
    last_delivered: u64,
}

impl SegmentationWorker {
    /// Starts the worker thread.
    ///
    /// `threshold` is applied on the worker: `confidence >= threshold` is
    /// foreground.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Spawn`] if the OS refuses the thread.
    pub fn spawn<E>(mut engine: E, threshold: f32) -> VisionResult<Self>
    where
        E: SegmentationEngine + 'static,
    {
        let (job_tx, job_rx) = bounded::<Job>(1);
        let (result_tx, result_rx) = bounded::<AnalysisOutcome>(1);
        let job_evict = job_rx.clone();
        let result_evict = result_rx.clone();
        let counters = Arc::new(Counters::default());

        let worker_counters = Arc::clone(&counters);
        let handle = thread::Builder::new()
            .name("segmentation".into())
            .spawn(move || {
                while let Ok(job) = job_rx.recv() {
                    let mask = match engine.analyze(&job.frame) {
                        Ok(mask) => Some(HitMask::from_confidence(&mask, threshold)),
                        Err(e) => {
                            tracing::debug!("Segmentation failed for frame {}: {}", job.sequence, e);
                            worker_counters.failed.fetch_add(1, Ordering::Relaxed);
                            None
                        }
                    };
                    worker_counters.analyzed.fetch_add(1, Ordering::Relaxed);
                    let outcome = AnalysisOutcome {
                        sequence: job.sequence,
                        timestamp: job.frame.timestamp(),
                        mask,
                    };
                    match send_latest(&result_tx, &result_evict, outcome) {
                        Ok(true) => {
                            worker_counters.stale_results.fetch_add(1, Ordering::Relaxed);
                        }
                        Ok(false) => {}
                        Err(()) => break,
                    }
                }
                tracing::debug!("Segmentation worker stopped");
            })
            .map_err(|e| VisionError::Spawn(e.to_string()))?;

        Ok(Self {
            job_tx: Some(job_tx),
            job_evict,
            result_rx,
            handle: Some(handle),
            counters,
            next_sequence: 1,
            last_delivered: 0,
        })
    }

    /// Offers a frame for analysis, evicting a frame still waiting in the slot.
    ///
    /// Never blocks. Returns the sequence number assigned to the frame.
    ///
    /// # Errors
    ///
    /// Returns [`VisionError::Disconnected`] if the worker thread is gone.
    pub fn submit(&mut self, frame: Frame) -> VisionResult<u64> {
        let tx = self.job_tx.as_ref().ok_or(VisionError::Disconnected)?;
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.counters.submitted.fetch_add(1, Ordering::Relaxed);

        match send_latest(tx, &self.job_evict, Job { sequence, frame }) {
            Ok(true) => {
                let evicted = self.counters.evicted.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::trace!("Segmentation busy, dropped a queued frame (total dropped: {})", evicted);
                Ok(sequence)
            }
            Ok(false) => Ok(sequence),
            Err(()) => Err(VisionError::Disconnected),
        }
    }

    /// Returns the newest result produced since the last call, if any.
    ///
    /// Results older than one already delivered are discarded.
    pub fn drain_latest(&mut self) -> Option<AnalysisOutcome> {
        let mut latest: Option<AnalysisOutcome> = None;
        for outcome in self.result_rx.try_iter() {
            if let Some(prev) = latest.take() {
                if prev.sequence > outcome.sequence {
                    latest = Some(prev);
                    self.counters.stale_results.fetch_add(1, Ordering::Relaxed);
                    continue;
                }
                self.counters.stale_results.fetch_add(1, Ordering::Relaxed);
            }
            latest = Some(outcome);
        }
        self.accept(latest)
    }

    /// Blocks up to `timeout` for a result, then behaves like [`drain_latest`](Self::drain_latest).
    pub fn wait_latest(&mut self, timeout: Duration) -> Option<AnalysisOutcome> {
        match self.result_rx.recv_timeout(timeout) {
            Ok(first) => {
                let newer = self.drain_latest();
                match newer {
                    Some(newer) if newer.sequence > first.sequence => Some(newer),
                    Some(_) | None => self.accept(Some(first)),
                }
            }
            Err(_) => None,
        }
    }

    /// Snapshot of the traffic counters.
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        WorkerStats {
            submitted: self.counters.submitted.load(Ordering::Relaxed),
            evicted: self.counters.evicted.load(Ordering::Relaxed),
            analyzed: self.counters.analyzed.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            stale_results: self.counters.stale_results.load(Ordering::Relaxed),
        }
    }

    fn accept(&mut self, outcome: Option<AnalysisOutcome>) -> Option<AnalysisOutcome> {
        let outcome = outcome?;
        if outcome.sequence <= self.last_delivered {
            self.counters.stale_results.fetch_add(1, Ordering::Relaxed);
            return None;
        }
        self.last_delivered = outcome.sequence;
        Some(outcome)
    }
}

impl Drop for SegmentationWorker {
    fn drop(&mut self) {
        self.job_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Segmentation worker panicked");
            }
        }
    }
}

/// Sends into a bounded(1) channel, evicting the queued item if the slot is full.
///
/// Retries until `item` itself sits in the slot, so a racing producer can
/// never leave an older item behind. Returns `Ok(true)` when something was
/// evicted, `Err(())` when the receiving side is gone.
fn send_latest<T>(tx: &Sender<T>, evict: &Receiver<T>, item: T) -> Result<bool, ()> {
    let mut item = item;
    let mut evicted = false;
    loop {
        match tx.try_send(item) {
            Ok(()) => return Ok(evicted),
            Err(TrySendError::Disconnected(_)) => return Err(()),
            Err(TrySendError::Full(back)) => {
                evicted |= evict.try_recv().is_ok();
                item = back;
            }
        }
    }
}
