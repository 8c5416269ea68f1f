//! Data provider trait and structured error types.
//!
//! Daily close/volume series come from Yahoo Finance, a local CSV directory or
//! a deterministic synthetic generator. Everything downstream only sees the
//! trait, so tests swap in in-memory providers.

use crate::domain::PriceBar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("no rows for {symbol} between {start} and {end}")]
    EmptyRange {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("csv import error in {path}: {message}")]
    Csv { path: String, message: String },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Whether another listing suffix is worth trying.
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            DataError::SymbolNotFound { .. } | DataError::EmptyRange { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub source: DataSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Source of daily bars for one instrument over an inclusive date range.
pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate)
        -> Result<FetchResult, DataError>;

    /// Whether the provider is currently accepting requests.
    fn is_available(&self) -> bool {
        true
    }
}
