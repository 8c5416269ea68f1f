//! SlopeScan Runner: watch-list orchestration, screening and export.
//!
//! This crate builds on `slopescan-core` to provide:
//! - TOML scan configuration with a content hash
//! - Data loading with listing resolution and synthetic fallback
//! - Parallel per-symbol analysis (frame, labels, backtest, advice)
//! - Backtest summaries per symbol and across the watch list
//! - JSON and CSV export

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod screen;

pub use config::{ConfigError, NormalizationConfig, ScanConfig};
pub use data_loader::{load_series, LoadError, LoadOptions, LoadedSeries};
pub use metrics::BacktestSummary;
pub use runner::{analyze_series, run, RunError, ScanReport, SkippedSymbol, SymbolAnalysis};
pub use screen::{AdviceRow, PvoStatus, ScreenReport, ScreenTier, VriStatus};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn scan_report_is_send_sync() {
        assert_send::<ScanReport>();
        assert_sync::<ScanReport>();
        assert_send::<SymbolAnalysis>();
        assert_sync::<SymbolAnalysis>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<ScanConfig>();
        assert_sync::<ScanConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }

    #[test]
    fn summary_is_send_sync() {
        assert_send::<BacktestSummary>();
        assert_sync::<BacktestSummary>();
    }

    #[test]
    fn run_error_is_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
