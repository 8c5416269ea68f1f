//! Scan configuration loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration.
//! The per-run inputs `as_of` and `lookback_days` can also be overridden
//! from the CLI; nothing here is process-global.

use serde::{Deserialize, Serialize};
use slopescan_core::backtest::{BacktestPolicy, PolicyError};
use slopescan_core::classify::ClassifierConfig;
use slopescan_core::data::clean_code;
use slopescan_core::frame::FrameSpec;
use slopescan_core::normalize::DEFAULT_WINDOW;
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BENCHMARK: &str = "0050.TW";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("invalid backtest policy: {0}")]
    Policy(#[from] PolicyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Trailing z-score window W.
    pub window: usize,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Reference instrument, scanned first and tagged as the benchmark.
    pub benchmark: Option<String>,
    /// Raw watch-list entries; bare Taiwan codes are resolved to a listing.
    pub watch_list: Vec<String>,
    /// Calendar days fetched up to and including `as_of`.
    pub lookback_days: u32,
    /// Frames with fewer rows are skipped.
    pub min_rows: usize,
    /// Advice rows emitted per symbol.
    pub recent_days: usize,
    pub indicators: FrameSpec,
    pub normalization: NormalizationConfig,
    pub classifier: ClassifierConfig,
    pub backtest: BacktestPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            benchmark: Some(DEFAULT_BENCHMARK.to_string()),
            watch_list: Vec::new(),
            lookback_days: 360,
            min_rows: 10,
            recent_days: 5,
            indicators: FrameSpec::default(),
            normalization: NormalizationConfig::default(),
            classifier: ClassifierConfig::default(),
            backtest: BacktestPolicy::default(),
        }
    }
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse, normalize and validate.
    ///
    /// `max_holding_days = 0` is read as "no cap".
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let mut cfg: ScanConfig = toml::from_str(text)?;
        if cfg.backtest.max_holding_days == Some(0) {
            cfg.backtest.max_holding_days = None;
        }
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("indicators: {e}")))?;
        if self.normalization.window == 0 {
            return Err(ConfigError::Invalid("normalization.window must be >= 1".into()));
        }
        if self.lookback_days == 0 {
            return Err(ConfigError::Invalid("lookback_days must be >= 1".into()));
        }
        self.backtest.validate()?;
        Ok(())
    }

    /// The benchmark ticker, unless configured as an empty string.
    pub fn benchmark_symbol(&self) -> Option<String> {
        self.benchmark
            .as_deref()
            .map(clean_code)
            .filter(|s| !s.is_empty())
    }

    /// Benchmark first, then cleaned watch-list codes, duplicates removed in
    /// order.
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let codes = self
            .benchmark_symbol()
            .into_iter()
            .chain(self.watch_list.iter().map(|s| clean_code(s)));
        for code in codes {
            if !code.is_empty() && !out.contains(&code) {
                out.push(code);
            }
        }
        out
    }

    /// BLAKE3 hex digest of the canonical JSON form.
    pub fn config_hash(&self) -> String {
        // Serialization of plain data cannot fail; fall back to Debug anyway.
        let canonical = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }
}
