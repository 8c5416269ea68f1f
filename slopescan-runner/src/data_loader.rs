//! Series loading and data resolution for the runner.
//!
//! For one watch-list entry:
//! 1. Resolve a bare Taiwan code to its `.TW` / `.TWO` listing
//! 2. Fetch from the provider and clean with `ingest`
//! 3. If the fetch fails and `synthetic` is set, generate synthetic bars (tagged)
//! 4. Otherwise fail with a clear error; an empty range is `DataUnavailable`
//!
//! Synthetic data is a developer-only mode. Results built on it carry
//! `DataSource::Synthetic` all the way to the report.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use slopescan_core::data::{
    generate_synthetic_bars, ingest, resolve_listing, DataError, DataProvider, DataSource,
};
use slopescan_core::domain::PriceBar;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data for '{symbol}' between {start} and {end}")]
    DataUnavailable {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("provider '{provider}' is not accepting requests (use --synthetic for synthetic data)")]
    ProviderUnavailable { provider: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// First calendar day requested (inclusive).
    pub start: NaiveDate,
    /// Last calendar day requested (inclusive); the run's as-of date.
    pub end: NaiveDate,
    /// Generate synthetic bars when real data is unavailable.
    pub synthetic: bool,
}

impl LoadOptions {
    /// `lookback_days` calendar days ending at `as_of`, both inclusive.
    pub fn for_run(as_of: NaiveDate, lookback_days: u32, synthetic: bool) -> Self {
        let back = u64::from(lookback_days.max(1) - 1);
        Self {
            start: as_of.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN),
            end: as_of,
            synthetic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedSeries {
    /// Provider ticker after listing resolution.
    pub symbol: String,
    pub bars: Vec<PriceBar>,
    pub source: DataSource,
    /// Bars removed by cleaning (duplicates and void closes).
    pub dropped_bars: usize,
    /// BLAKE3 over dates, closes and volumes.
    pub dataset_hash: String,
}

impl LoadedSeries {
    /// Clean raw bars with `ingest` and fingerprint the result.
    pub fn from_bars(symbol: impl Into<String>, bars: Vec<PriceBar>, source: DataSource) -> Self {
        let report = ingest(bars);
        let dropped_bars = report.dropped();
        let dataset_hash = dataset_hash(&report.bars);
        Self {
            symbol: symbol.into(),
            bars: report.bars,
            source,
            dropped_bars,
            dataset_hash,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == DataSource::Synthetic
    }
}

/// Load and clean one symbol's series over `opts`.
pub fn load_series(
    provider: &dyn DataProvider,
    raw_symbol: &str,
    opts: &LoadOptions,
) -> Result<LoadedSeries, LoadError> {
    let symbol = resolve_listing(provider, raw_symbol, opts.end);

    let fetched = if provider.is_available() {
        provider
            .fetch(&symbol, opts.start, opts.end)
            .map(|r| (r.bars, r.source))
    } else {
        Err(DataError::CircuitBreakerTripped)
    };

    let (bars, source) = match fetched {
        Ok(ok) => ok,
        Err(e) if opts.synthetic => {
            tracing::warn!(
                symbol = %symbol,
                error = %e,
                "generating synthetic data; results will be tagged as synthetic"
            );
            (
                generate_synthetic_bars(&symbol, opts.start, opts.end),
                DataSource::Synthetic,
            )
        }
        Err(e) if e.is_missing() => {
            return Err(LoadError::DataUnavailable {
                symbol,
                start: opts.start,
                end: opts.end,
            })
        }
        Err(DataError::CircuitBreakerTripped) => {
            return Err(LoadError::ProviderUnavailable {
                provider: provider.name().to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    let loaded = LoadedSeries::from_bars(symbol, bars, source);
    if loaded.bars.is_empty() {
        return Err(LoadError::DataUnavailable {
            symbol: loaded.symbol,
            start: opts.start,
            end: opts.end,
        });
    }
    tracing::debug!(
        symbol = %loaded.symbol,
        source = ?loaded.source,
        rows = loaded.bars.len(),
        dropped = loaded.dropped_bars,
        "loaded series"
    );
    Ok(loaded)
}

fn dataset_hash(bars: &[PriceBar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.date.to_string().as_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
