//! # Segmentation Pipeline Test
//!
//! Drives the worker with a deliberately slow engine and checks the
//! keep-only-latest policy end to end.

use std::thread;
use std::time::{Duration, Instant};

use mirrorplay_core::{Frame, PixelFormat};
use mirrorplay_vision::{
    BackgroundDiffSegmenter, SegmentationEngine, SegmentationMask, SegmentationWorker, VisionResult,
};

fn frame(value: u8, ts_ms: u64) -> Frame {
    let data: Vec<u8> = [value, value, value, 255].repeat(16 * 8);
    Frame::new(16, 8, PixelFormat::Rgba8, data)
        .unwrap()
        .with_timestamp(Duration::from_millis(ts_ms))
}

struct SlowEngine;

impl SegmentationEngine for SlowEngine {
    fn analyze(&mut self, frame: &Frame) -> VisionResult<SegmentationMask> {
        thread::sleep(Duration::from_millis(15));
        SegmentationMask::new(frame.width(), frame.height(), vec![0.5; frame.pixel_count()])
    }
}

#[test]
fn test_slow_engine_drops_intermediate_frames() {
    let mut worker = SegmentationWorker::spawn(SlowEngine, 0.99).unwrap();
    let mut last = 0;
    for i in 0..40 {
        last = worker.submit(frame(0, i)).unwrap();
    }

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut newest = 0;
    while newest < last && Instant::now() < deadline {
        if let Some(outcome) = worker.wait_latest(Duration::from_millis(100)) {
            assert!(outcome.sequence > newest, "results never go backwards");
            newest = outcome.sequence;
            let mask = outcome.mask.unwrap();
            assert!(!mask.is_foreground(0, 0), "0.5 is below the threshold");
        }
    }

    assert_eq!(newest, last, "the last submitted frame is always analysed");
    let stats = worker.stats();
    assert!(stats.evicted > 0);
    assert!(stats.analyzed < 40);
    assert_eq!(stats.submitted, 40);
}

#[test]
fn test_background_segmenter_through_worker() {
    let mut worker = SegmentationWorker::spawn(BackgroundDiffSegmenter::new(2, 1), 0.99).unwrap();

    // Two learning frames produce empty outcomes.
    for ts in 0..2 {
        worker.submit(frame(20, ts)).unwrap();
        let outcome = worker.wait_latest(Duration::from_secs(5)).unwrap();
        assert!(outcome.mask.is_none());
    }

    worker.submit(frame(220, 2)).unwrap();
    let mask = worker.wait_latest(Duration::from_secs(5)).unwrap().mask.unwrap();
    assert_eq!((mask.width(), mask.height()), (16, 8));
    assert_eq!(mask.lit_halves(), (64, 64));
}
