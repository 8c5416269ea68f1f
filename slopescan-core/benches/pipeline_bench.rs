//! Criterion benchmarks for SlopeScan hot paths.
//!
//! Benchmarks:
//! 1. Indicator frame build (PVO, VRI, slope, composite)
//! 2. Rolling z-score normalization
//! 3. Classification of every day
//! 4. Backtest over a classified series

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use slopescan_core::backtest::{run_backtest, BacktestPolicy};
use slopescan_core::classify::{classify_all, ClassifierMode};
use slopescan_core::domain::PriceBar;
use slopescan_core::frame::IndicatorFrame;
use slopescan_core::normalize::{NormalizedFrame, DEFAULT_WINDOW};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<PriceBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.02;
            let volume = 1_000_000 + ((i as u64 * 7919) % 500_000);
            PriceBar::new(base_date + chrono::Days::new(i as u64), close, volume)
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_build");
    for n in [250usize, 1000, 5000] {
        let bars = make_bars(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |b, bars| {
            b.iter(|| IndicatorFrame::build(black_box(bars)))
        });
    }
    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let frame = IndicatorFrame::build(&make_bars(1000)).unwrap_or_default();
    c.bench_function("normalize_1000", |b| {
        b.iter(|| NormalizedFrame::new(black_box(&frame), DEFAULT_WINDOW))
    });
}

fn bench_classify(c: &mut Criterion) {
    let frame = IndicatorFrame::build(&make_bars(1000)).unwrap_or_default();
    let nf = NormalizedFrame::new(&frame, DEFAULT_WINDOW);
    c.bench_function("classify_all_1000", |b| {
        b.iter(|| classify_all(black_box(&nf), ClassifierMode::Full))
    });
}

fn bench_backtest(c: &mut Criterion) {
    let frame = IndicatorFrame::build(&make_bars(1000)).unwrap_or_default();
    let nf = NormalizedFrame::new(&frame, DEFAULT_WINDOW);
    let days = classify_all(&nf, ClassifierMode::Full);
    let policy = BacktestPolicy {
        entry_states: vec![
            slopescan_core::domain::MarketState::StrongBuy,
            slopescan_core::domain::MarketState::TrendHold,
        ],
        ..Default::default()
    };
    c.bench_function("backtest_1000", |b| {
        b.iter(|| run_backtest("BENCH", black_box(&days), &policy))
    });
}

criterion_group!(benches, bench_frame, bench_normalize, bench_classify, bench_backtest);
criterion_main!(benches);
