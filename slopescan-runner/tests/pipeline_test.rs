//! Integration tests for the scan pipeline with an in-memory provider.

use chrono::{Days, NaiveDate};
use std::collections::HashMap;

use slopescan_core::data::{DataError, DataProvider, DataSource, FetchResult};
use slopescan_core::domain::{ExitReason, PriceBar};
use slopescan_runner::export::{load_artifacts, save_artifacts};
use slopescan_runner::{run, RunError, ScanConfig, ScreenTier};

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn bars_from(closes: &[f64], volumes: &[u64]) -> Vec<PriceBar> {
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&c, &v))| PriceBar::new(base_date() + Days::new(i as u64), c, v))
        .collect()
}

/// Flat, a volume-backed jump, a +2% run, a 15% drop, then flat. 142 days.
fn breakout_series() -> Vec<PriceBar> {
    let mut closes = vec![100.0; 100];
    let mut volumes = vec![1000u64; 100];
    closes.push(105.0);
    volumes.push(5000);
    for _ in 0..10 {
        let last = *closes.last().unwrap();
        closes.push(last * 1.02);
        volumes.push(5000);
    }
    let top = *closes.last().unwrap();
    closes.push(top * 0.85);
    volumes.push(5000);
    for _ in 0..30 {
        let last = *closes.last().unwrap();
        closes.push(last);
        volumes.push(5000);
    }
    bars_from(&closes, &volumes)
}

fn flat_series() -> Vec<PriceBar> {
    bars_from(&[50.0; 142], &[1000; 142])
}

struct InMemory {
    series: HashMap<String, Vec<PriceBar>>,
}

impl InMemory {
    fn new(entries: Vec<(&str, Vec<PriceBar>)>) -> Self {
        Self {
            series: entries
                .into_iter()
                .map(|(s, b)| (s.to_string(), b))
                .collect(),
        }
    }
}

impl DataProvider for InMemory {
    fn name(&self) -> &str {
        "in_memory"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<FetchResult, DataError> {
        let all = self.series.get(symbol).ok_or_else(|| DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        })?;
        let bars: Vec<PriceBar> = all
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .cloned()
            .collect();
        if bars.is_empty() {
            return Err(DataError::EmptyRange {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }
}

struct Offline;

impl DataProvider for Offline {
    fn name(&self) -> &str {
        "offline"
    }

    fn fetch(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<FetchResult, DataError> {
        Err(DataError::NetworkUnreachable("no route to host".into()))
    }
}

fn as_of() -> NaiveDate {
    breakout_series().last().unwrap().date
}

fn provider() -> InMemory {
    let short: Vec<PriceBar> = flat_series().into_iter().skip(122).collect();
    InMemory::new(vec![
        ("0050.TW", breakout_series()),
        ("BRK", breakout_series()),
        ("2330.TWO", flat_series()),
        ("SHORT", short),
    ])
}

fn config() -> ScanConfig {
    ScanConfig {
        watch_list: vec![
            "BRK".into(),
            "$2330".into(),
            "MISSING".into(),
            "SHORT".into(),
            "BRK".into(),
        ],
        ..ScanConfig::default()
    }
}

#[test]
fn scan_keeps_watch_list_order_and_skips_failures() {
    let cfg = config();
    let report = run(&provider(), &cfg, as_of(), cfg.lookback_days, false).unwrap();

    let analyzed: Vec<&str> = report.analyses.iter().map(|a| a.symbol.as_str()).collect();
    assert_eq!(analyzed, vec!["0050.TW", "BRK", "2330.TWO"]);

    let skipped: Vec<&str> = report.skipped.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(skipped, vec!["MISSING", "SHORT"]);
    assert!(report.skipped[0].reason.contains("no data"));
    assert!(report.skipped[1].reason.contains("need at least 10"));

    assert!(report.analyses[0].is_benchmark);
    assert!(!report.analyses[1].is_benchmark);
    assert!(!report.has_synthetic);
    assert_eq!(report.config_hash, cfg.config_hash());
}

#[test]
fn breakout_trade_flows_through_the_report() {
    let cfg = config();
    let report = run(&provider(), &cfg, as_of(), cfg.lookback_days, false).unwrap();

    let brk = report.analysis("BRK").unwrap();
    assert_eq!(brk.bar_count, 142);
    assert_eq!(brk.days.len(), 117);
    assert_eq!(brk.trades.len(), 1);
    let trade = &brk.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::Reversal);
    assert_eq!(trade.holding_days, 12);
    assert_eq!(brk.summary.trade_count, 1);
    assert_eq!(brk.summary.win_rate, 1.0);
    assert_eq!(brk.summary.hits_plus_20, 1);

    // benchmark trades the same series but stays out of the aggregate
    assert_eq!(report.analysis("0050.TW").unwrap().trades.len(), 1);
    assert_eq!(report.aggregate.trade_count, 1);
    assert!((report.aggregate.total_return_pct - trade.return_pct).abs() < 1e-9);

    let flat = report.analysis("2330.TWO").unwrap();
    assert!(flat.trades.is_empty());
    assert_eq!(flat.summary.equity_curve, vec![1.0]);
}

#[test]
fn position_open_at_as_of_is_force_closed() {
    let cfg = config();
    // seventh day of the +2% run, four days before the drop
    let cutoff = base_date() + Days::new(107);
    let report = run(&provider(), &cfg, cutoff, cfg.lookback_days, false).unwrap();

    let brk = report.analysis("BRK").unwrap();
    assert_eq!(brk.days.len(), 83);
    assert_eq!(brk.trades.len(), 1);
    let trade = &brk.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::EndOfData);
    assert_eq!(trade.exit_date, cutoff);
    assert_eq!(trade.exit_date, brk.days.last().unwrap().date);
    assert_eq!(trade.holding_days, 8);
    assert_eq!(trade.days_to_plus_10, Some(6));
    assert_eq!(trade.days_to_plus_20, None);
    assert_eq!(brk.summary.forced_closes, 1);
    assert_eq!(report.aggregate.forced_closes, 1);
}

#[test]
fn invalid_config_fails_before_fetching() {
    let mut cfg = config();
    cfg.indicators.pvo_fast = 26;
    cfg.indicators.pvo_slow = 12;
    let err = run(&provider(), &cfg, as_of(), cfg.lookback_days, false).unwrap_err();
    assert!(matches!(err, RunError::Config(_)));

    let err = run(&Offline, &cfg, as_of(), cfg.lookback_days, true).unwrap_err();
    assert!(err.to_string().contains("pvo_slow"));
}

#[test]
fn screen_report_has_recent_rows_per_symbol() {
    let cfg = config();
    let report = run(&provider(), &cfg, as_of(), cfg.lookback_days, false).unwrap();
    let screen = report.screen();

    assert_eq!(screen.rows.len(), 3 * cfg.recent_days);
    let latest: Vec<&str> = screen.latest().map(|r| r.symbol.as_str()).collect();
    assert_eq!(latest, vec!["0050.TW", "BRK", "2330.TWO"]);
    assert_eq!(
        screen.by_tier(ScreenTier::Benchmark, 10)[0].symbol,
        "0050.TW"
    );
    for row in screen.rows_for("BRK") {
        assert!(row.date <= as_of());
    }
}

#[test]
fn offline_without_synthetic_skips_everything() {
    let cfg = config();
    let report = run(&Offline, &cfg, as_of(), cfg.lookback_days, false).unwrap();
    assert!(report.analyses.is_empty());
    assert_eq!(report.skipped.len(), 5);
    assert!(report.skipped[0].reason.contains("network unreachable"));
    assert_eq!(report.aggregate.trade_count, 0);
}

#[test]
fn offline_with_synthetic_is_tagged() {
    let cfg = ScanConfig {
        watch_list: vec!["2330".into()],
        ..ScanConfig::default()
    };
    let report = run(&Offline, &cfg, as_of(), cfg.lookback_days, true).unwrap();
    assert_eq!(report.analyses.len(), 2);
    assert!(report.has_synthetic);
    assert!(report
        .analyses
        .iter()
        .all(|a| a.source == DataSource::Synthetic));
}

#[test]
fn scan_is_deterministic() {
    let cfg = config();
    let a = run(&provider(), &cfg, as_of(), cfg.lookback_days, false).unwrap();
    let b = run(&provider(), &cfg, as_of(), cfg.lookback_days, false).unwrap();
    assert_eq!(a, b);
}

#[test]
fn artifacts_round_trip() {
    let cfg = config();
    let report = run(&provider(), &cfg, as_of(), cfg.lookback_days, false).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let run_dir = save_artifacts(&report, dir.path()).unwrap();

    let trades_csv = std::fs::read_to_string(run_dir.join("trades.csv")).unwrap();
    // header + benchmark trade + BRK trade
    assert_eq!(trades_csv.lines().count(), 3);
    let advice_csv = std::fs::read_to_string(run_dir.join("advice.csv")).unwrap();
    assert_eq!(advice_csv.lines().count(), 1 + 3 * cfg.recent_days);

    let loaded = load_artifacts(&run_dir).unwrap();
    assert_eq!(loaded.as_of, report.as_of);
    assert_eq!(loaded.analyses.len(), 3);
    assert_eq!(loaded.skipped, report.skipped);
    assert_eq!(loaded.analyses[1].trades[0].exit_date, report.analyses[1].trades[0].exit_date);
}
