//! # Mask Conversion Benchmark
//!
//! Thresholding and view lookups run once per analysed frame and once per
//! ball per tick. Measured at the analysis resolution (640x480) and at a
//! typical model output (256x256).

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mirrorplay_vision::{HitMask, SegmentationMask};

fn gradient(width: u32, height: u32) -> SegmentationMask {
    let n = (width * height) as usize;
    let confidence = (0..n).map(|i| i as f32 / n as f32).collect();
    SegmentationMask::new(width, height, confidence).unwrap()
}

fn bench_threshold(c: &mut Criterion) {
    let mut group = c.benchmark_group("mask_threshold");
    for (w, h) in [(256u32, 256u32), (640, 480)] {
        let mask = gradient(w, h);
        group.throughput(Throughput::Elements(u64::from(w * h)));
        group.bench_with_input(BenchmarkId::new("from_confidence", format!("{w}x{h}")), &mask, |b, m| {
            b.iter(|| HitMask::from_confidence(black_box(m), 0.99));
        });
    }
    group.finish();
}

fn bench_lookups(c: &mut Criterion) {
    let hit = HitMask::from_confidence(&gradient(640, 480), 0.5);
    c.bench_function("mask_sample_view_32_balls", |b| {
        b.iter(|| {
            let mut lit = 0u32;
            for i in 0..32 {
                let x = (i * 60) as f32;
                if hit.sample_view(black_box(x), black_box(540.0), 1920.0, 1080.0) {
                    lit += 1;
                }
            }
            lit
        });
    });
    c.bench_function("mask_lit_halves_640x480", |b| b.iter(|| black_box(&hit).lit_halves()));
}

criterion_group!(benches, bench_threshold, bench_lookups);
criterion_main!(benches);
