// ============================================================================
// Fixed-Point and Book Feed Benchmarks
// ============================================================================
//
// Benchmark Categories:
// 1. Arithmetic - checked operations on FixedPoint256
// 2. Text - parsing and rendering at several scales
// 3. Feed - frame decoding and snapshot rendering through the book feed
// ============================================================================

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use perp_feed::prelude::*;
use std::hint::black_box;
use std::sync::Arc;

fn fp(text: &str, scale: u8) -> FixedPoint256 {
    FixedPoint256::from_text(text, scale).unwrap()
}

// ============================================================================
// Arithmetic Benchmarks
// ============================================================================

fn benchmark_arithmetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_point_arithmetic");

    for scale in [6u8, 18, 36].iter() {
        let a = fp("123456789.123456789", *scale);
        let b = fp("0.9992", *scale);

        group.bench_with_input(BenchmarkId::new("add", scale), &(a, b), |bench, (a, b)| {
            bench.iter(|| black_box(black_box(*a).checked_add(black_box(*b))));
        });
        group.bench_with_input(BenchmarkId::new("mul", scale), &(a, b), |bench, (a, b)| {
            bench.iter(|| black_box(black_box(*a).checked_mul(black_box(*b))));
        });
        group.bench_with_input(BenchmarkId::new("div", scale), &(a, b), |bench, (a, b)| {
            bench.iter(|| black_box(black_box(*a).checked_div(black_box(*b))));
        });
    }

    group.finish();
}

// ============================================================================
// Text Benchmarks
// ============================================================================

fn benchmark_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixed_point_text");

    for text in ["2000.5", "115792089237316195423570985008687907853269984665640564039457.584007"]
        .iter()
    {
        group.bench_with_input(BenchmarkId::new("parse", text.len()), text, |b, text| {
            b.iter(|| black_box(FixedPoint256::from_text(black_box(text), 6)));
        });

        let value = fp(text, 6);
        group.bench_with_input(BenchmarkId::new("render", text.len()), &value, |b, value| {
            b.iter(|| black_box(black_box(value).to_text()));
        });
    }

    group.finish();
}

// ============================================================================
// Feed Benchmarks
// ============================================================================

fn aevo_update(seq: usize, bid: usize, ask: usize) -> String {
    format!(
        r#"{{"channel":"orderbook:ETH-PERP","data":{{"type":"update","bids":[["{}.5","1.25"]],"asks":[["{}.5","2"]],"last_updated":"{}"}}}}"#,
        bid, ask, seq
    )
}

fn benchmark_feed_frames(c: &mut Criterion) {
    c.bench_function("aevo_frame_apply", |b| {
        let feed = create_feed(FeedConfig::aevo("ETH-PERP"), Arc::new(NoOpEventHandler)).unwrap();
        let mut seq = 0usize;

        b.iter_batched(
            || {
                // sequences must keep increasing or the feed skips the frame
                seq += 1;
                aevo_update(seq, 1950 + seq % 50, 2050 - seq % 50)
            },
            |frame| black_box(feed.handle_frame(&frame)),
            BatchSize::SmallInput,
        );
    });
}

fn benchmark_snapshot_render(c: &mut Criterion) {
    c.bench_function("book_snapshot_render", |b| {
        let feed = create_feed(FeedConfig::aevo("ETH-PERP"), Arc::new(NoOpEventHandler)).unwrap();

        // Pre-populate book with 100 levels on each side
        for i in 0..100 {
            feed.handle_frame(&aevo_update(i + 1, 1900 - i, 2000 + i)).unwrap();
        }

        b.iter(|| black_box(feed.render()));
    });
}

criterion_group!(
    benches,
    benchmark_arithmetic,
    benchmark_text,
    benchmark_feed_frames,
    benchmark_snapshot_render,
);
criterion_main!(benches);
