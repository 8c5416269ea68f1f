//! Scan runner: wires together loading, indicators, classification,
//! backtest and the screening report.
//!
//! Two entry points:
//! - `run()`: loads every watch-list symbol through a provider and analyzes
//!   them in parallel. Used by the CLI `screen` and `backtest` commands.
//! - `analyze_series()`: analyzes one pre-loaded series, no I/O. Used by
//!   `run()` and by the CLI `classify` command.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use slopescan_core::backtest::run_backtest;
use slopescan_core::classify::{classify_all, ClassifiedDay, ClassifierMode};
use slopescan_core::data::{DataProvider, DataSource};
use slopescan_core::domain::TradeRecord;
use slopescan_core::frame::{FrameError, IndicatorFrame};
use slopescan_core::normalize::NormalizedFrame;

use crate::config::{ConfigError, ScanConfig};
use crate::data_loader::{load_series, LoadError, LoadOptions, LoadedSeries};
use crate::metrics::BacktestSummary;
use crate::screen::{advice_rows, AdviceRow, ScreenReport};

/// Errors from analyzing one symbol. Only `Config` aborts a scan; the rest
/// skip the symbol.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("'{symbol}' has {rows} indicator rows, need at least {min_rows}")]
    InsufficientHistory {
        symbol: String,
        rows: usize,
        min_rows: usize,
    },
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("malformed series for '{symbol}': {source}")]
    Frame {
        symbol: String,
        #[source]
        source: FrameError,
    },
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Everything computed for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolAnalysis {
    /// Provider ticker after listing resolution.
    pub symbol: String,
    pub is_benchmark: bool,
    pub source: DataSource,
    pub dataset_hash: String,
    pub bar_count: usize,
    pub dropped_bars: usize,
    /// One entry per indicator-frame row, oldest first.
    pub days: Vec<ClassifiedDay>,
    /// The latest `recent_days` rows.
    pub advice: Vec<AdviceRow>,
    pub trades: Vec<TradeRecord>,
    pub summary: BacktestSummary,
}

impl SymbolAnalysis {
    pub fn latest(&self) -> Option<&AdviceRow> {
        self.advice.last()
    }
}

/// A watch-list entry that produced no analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

/// Result of one scan over the watch list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub as_of: NaiveDate,
    pub lookback_days: u32,
    pub config_hash: String,
    pub classifier_mode: ClassifierMode,
    pub has_synthetic: bool,
    /// Analyses in watch-list order, benchmark first.
    pub analyses: Vec<SymbolAnalysis>,
    pub skipped: Vec<SkippedSymbol>,
    /// All non-benchmark trades, in exit-date order.
    pub aggregate: BacktestSummary,
}

impl ScanReport {
    /// Advice rows of every analyzed symbol, in watch-list order.
    pub fn screen(&self) -> ScreenReport {
        ScreenReport::new(
            self.analyses
                .iter()
                .flat_map(|a| a.advice.iter().cloned())
                .collect(),
        )
    }

    pub fn analysis(&self, symbol: &str) -> Option<&SymbolAnalysis> {
        self.analyses.iter().find(|a| a.symbol == symbol)
    }

    /// Trades of every analyzed symbol, in watch-list order.
    pub fn trades(&self) -> impl Iterator<Item = &TradeRecord> {
        self.analyses.iter().flat_map(|a| a.trades.iter())
    }
}

/// Analyze one cleaned series: frame, z-scores, labels, backtest, advice.
pub fn analyze_series(
    loaded: &LoadedSeries,
    is_benchmark: bool,
    config: &ScanConfig,
) -> Result<SymbolAnalysis, RunError> {
    config.validate()?;
    analyze_validated(loaded, is_benchmark, config)
}

fn analyze_validated(
    loaded: &LoadedSeries,
    is_benchmark: bool,
    config: &ScanConfig,
) -> Result<SymbolAnalysis, RunError> {
    let symbol = loaded.symbol.as_str();
    let frame = IndicatorFrame::build_with(&loaded.bars, &config.indicators).map_err(|source| {
        RunError::Frame {
            symbol: symbol.to_string(),
            source,
        }
    })?;
    if frame.len() < config.min_rows.max(1) {
        return Err(RunError::InsufficientHistory {
            symbol: symbol.to_string(),
            rows: frame.len(),
            min_rows: config.min_rows.max(1),
        });
    }

    let normalized = NormalizedFrame::new(&frame, config.normalization.window);
    let mode = config.classifier.mode;
    let days = classify_all(&normalized, mode);
    let trades = run_backtest(symbol, &days, &config.backtest);
    let summary = BacktestSummary::compute(&trades);
    let advice = advice_rows(
        symbol,
        is_benchmark,
        &normalized,
        mode,
        config.classifier.onset_lookback,
        config.recent_days,
    );

    Ok(SymbolAnalysis {
        symbol: symbol.to_string(),
        is_benchmark,
        source: loaded.source,
        dataset_hash: loaded.dataset_hash.clone(),
        bar_count: loaded.bars.len(),
        dropped_bars: loaded.dropped_bars,
        days,
        advice,
        trades,
        summary,
    })
}

/// Load and analyze one watch-list entry.
fn scan_symbol(
    provider: &dyn DataProvider,
    raw_symbol: &str,
    is_benchmark: bool,
    config: &ScanConfig,
    opts: &LoadOptions,
) -> Result<SymbolAnalysis, RunError> {
    let loaded = load_series(provider, raw_symbol, opts)?;
    analyze_validated(&loaded, is_benchmark, config)
}

/// Scan the benchmark and watch list as of `as_of`.
///
/// Symbols run in parallel; the report keeps watch-list order. A symbol that
/// fails to load or has too little history is recorded in `skipped` and the
/// scan continues. An invalid config fails before any fetch.
pub fn run(
    provider: &dyn DataProvider,
    config: &ScanConfig,
    as_of: NaiveDate,
    lookback_days: u32,
    synthetic: bool,
) -> Result<ScanReport, RunError> {
    config.validate()?;
    let opts = LoadOptions::for_run(as_of, lookback_days, synthetic);
    let benchmark = config.benchmark_symbol();
    let symbols = config.symbols();

    let results: Vec<(String, Result<SymbolAnalysis, RunError>)> = symbols
        .par_iter()
        .map(|code| {
            let is_benchmark = benchmark.as_deref() == Some(code.as_str());
            let result = scan_symbol(provider, code, is_benchmark, config, &opts);
            (code.clone(), result)
        })
        .collect();

    let mut analyses = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();
    for (code, result) in results {
        match result {
            Ok(analysis) => analyses.push(analysis),
            Err(e) => {
                tracing::warn!(symbol = %code, reason = %e, "skipping symbol");
                skipped.push(SkippedSymbol {
                    symbol: code,
                    reason: e.to_string(),
                });
            }
        }
    }

    let aggregate = BacktestSummary::compute_combined(
        analyses
            .iter()
            .filter(|a| !a.is_benchmark)
            .flat_map(|a| a.trades.iter()),
    );
    let has_synthetic = analyses.iter().any(|a| a.source == DataSource::Synthetic);

    tracing::info!(
        as_of = %as_of,
        analyzed = analyses.len(),
        skipped = skipped.len(),
        trades = aggregate.trade_count,
        synthetic = has_synthetic,
        "scan complete"
    );

    Ok(ScanReport {
        schema_version: SCHEMA_VERSION,
        as_of,
        lookback_days,
        config_hash: config.config_hash(),
        classifier_mode: config.classifier.mode,
        has_synthetic,
        analyses,
        skipped,
        aggregate,
    })
}
