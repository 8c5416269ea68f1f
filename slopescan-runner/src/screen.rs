//! Screening report: recent-day advice rows per symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use slopescan_core::classify::{
    classify_at, direction_onset, ClassifierInputs, ClassifierMode, BEARISH_Z, HOLD_Z, STRONG_Z,
};
use slopescan_core::domain::MarketState;
use slopescan_core::normalize::NormalizedFrame;
use std::fmt;

/// Coarse action tier from slope_z alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenTier {
    Benchmark,
    Strong,
    Hold,
    Bearish,
    Wait,
}

impl ScreenTier {
    pub fn from_slope_z(slope_z: f64, is_benchmark: bool) -> Self {
        if is_benchmark {
            ScreenTier::Benchmark
        } else if slope_z > HOLD_Z {
            if slope_z > STRONG_Z {
                ScreenTier::Strong
            } else {
                ScreenTier::Hold
            }
        } else if slope_z < BEARISH_Z {
            ScreenTier::Bearish
        } else {
            ScreenTier::Wait
        }
    }
}

/// Volume-oscillator reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PvoStatus {
    /// Day-over-day PVO jump above 10.
    Ignition,
    Inflow,
    Idle,
}

impl PvoStatus {
    pub fn classify(pvo: f64, pvo_delta: f64) -> Self {
        if pvo_delta > 10.0 {
            PvoStatus::Ignition
        } else if pvo > 0.0 {
            PvoStatus::Inflow
        } else {
            PvoStatus::Idle
        }
    }
}

/// Volume skew ratio reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VriStatus {
    Healthy,
    Overheated,
    Consolidating,
}

impl VriStatus {
    pub fn classify(vri: f64) -> Self {
        if (40.0..=70.0).contains(&vri) {
            VriStatus::Healthy
        } else if vri > 90.0 {
            VriStatus::Overheated
        } else {
            VriStatus::Consolidating
        }
    }
}

impl ScreenTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenTier::Benchmark => "benchmark",
            ScreenTier::Strong => "strong",
            ScreenTier::Hold => "hold",
            ScreenTier::Bearish => "bearish",
            ScreenTier::Wait => "wait",
        }
    }
}

impl PvoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PvoStatus::Ignition => "ignition",
            PvoStatus::Inflow => "inflow",
            PvoStatus::Idle => "idle",
        }
    }
}

impl VriStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VriStatus::Healthy => "healthy",
            VriStatus::Overheated => "overheated",
            VriStatus::Consolidating => "consolidating",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {$(
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    )*};
}

display_as_str!(ScreenTier, PvoStatus, VriStatus);

/// One screened day for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume_oscillator: f64,
    pub volume_skew_ratio: f64,
    pub slope_pct: f64,
    pub slope_z: f64,
    pub composite_score: f64,
    pub score_z: f64,
    pub state: MarketState,
    /// "MM/DD Long", "today Short" or "---".
    pub onset: String,
    pub tier: ScreenTier,
    pub pvo_status: PvoStatus,
    pub vri_status: VriStatus,
}

/// Advice rows for the latest `recent_days` frame rows, oldest first.
pub fn advice_rows(
    symbol: &str,
    is_benchmark: bool,
    frame: &NormalizedFrame,
    mode: ClassifierMode,
    onset_lookback: usize,
    recent_days: usize,
) -> Vec<AdviceRow> {
    let start = frame.len().saturating_sub(recent_days);
    (start..frame.len())
        .filter_map(|idx| {
            let row = frame.get(idx)?;
            let inputs = ClassifierInputs::at(frame, idx)?;
            let day = classify_at(frame, idx, mode)?;
            let onset = direction_onset(frame, idx, onset_lookback)?;
            Some(AdviceRow {
                symbol: symbol.to_string(),
                date: row.row.date,
                close: row.row.close,
                volume_oscillator: row.row.volume_oscillator,
                volume_skew_ratio: row.row.volume_skew_ratio,
                slope_pct: row.row.slope_pct,
                slope_z: row.slope_z,
                composite_score: row.row.composite_score,
                score_z: row.score_z,
                state: day.state,
                onset: onset.to_string(),
                tier: ScreenTier::from_slope_z(row.slope_z, is_benchmark),
                pvo_status: PvoStatus::classify(
                    row.row.volume_oscillator,
                    inputs.volume_osc_delta,
                ),
                vri_status: VriStatus::classify(row.row.volume_skew_ratio),
            })
        })
        .collect()
}

/// Advice rows for a whole scan, grouped by symbol in watch-list order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenReport {
    pub rows: Vec<AdviceRow>,
}

impl ScreenReport {
    pub fn new(rows: Vec<AdviceRow>) -> Self {
        Self { rows }
    }

    /// The last row of each symbol, in order.
    pub fn latest(&self) -> impl Iterator<Item = &AdviceRow> {
        let rows = &self.rows;
        rows.iter().enumerate().filter_map(move |(i, row)| {
            match rows.get(i + 1) {
                Some(next) if next.symbol == row.symbol => None,
                _ => Some(row),
            }
        })
    }

    /// Latest rows whose tier matches, at most `limit` of them.
    pub fn by_tier(&self, tier: ScreenTier, limit: usize) -> Vec<&AdviceRow> {
        self.latest().filter(|r| r.tier == tier).take(limit).collect()
    }

    pub fn rows_for<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a AdviceRow> + 'a {
        self.rows.iter().filter(move |r| r.symbol == symbol)
    }
}
