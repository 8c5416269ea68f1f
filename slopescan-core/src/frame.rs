//! IndicatorFrame: one typed row per trading day with every derived field.
//!
//! Built once per instrument from an ascending bar series. Leading bars that
//! lack full history for any indicator are dropped; a series too short to
//! produce a single complete row yields an empty frame rather than an error.

use crate::domain::PriceBar;
use crate::indicators::{Indicator, SlopePct, VolumeOscillator, VolumeSkewRatio};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Composite score weights: slope, volume oscillator, volume skew ratio.
pub const SCORE_WEIGHTS: (f64, f64, f64) = (0.6, 0.2, 0.2);

/// Malformed input shape. Degenerate-but-valid data never produces these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("bars out of order: {current} does not follow {previous}")]
    Unordered {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("invalid close {close} on {date}")]
    InvalidClose { date: NaiveDate, close: f64 },

    #[error("invalid indicator windows: {0}")]
    InvalidSpec(String),
}

/// Indicator windows. Defaults: PVO 12/26, VRI 14, slope 5.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSpec {
    pub pvo_fast: usize,
    pub pvo_slow: usize,
    pub vri_period: usize,
    pub slope_window: usize,
}

impl Default for FrameSpec {
    fn default() -> Self {
        Self {
            pvo_fast: 12,
            pvo_slow: 26,
            vri_period: 14,
            slope_window: 5,
        }
    }
}

impl FrameSpec {
    pub fn validate(&self) -> Result<(), FrameError> {
        if self.pvo_fast == 0 || self.pvo_slow <= self.pvo_fast {
            return Err(FrameError::InvalidSpec(format!(
                "pvo_slow ({}) must exceed pvo_fast ({}) and pvo_fast must be >= 1",
                self.pvo_slow, self.pvo_fast
            )));
        }
        if self.vri_period == 0 {
            return Err(FrameError::InvalidSpec("vri_period must be >= 1".into()));
        }
        if self.slope_window < 2 {
            return Err(FrameError::InvalidSpec("slope_window must be >= 2".into()));
        }
        Ok(())
    }

    /// Bars consumed before the first complete row.
    pub fn warmup(&self) -> usize {
        self.pvo_slow
            .saturating_sub(1)
            .max(self.vri_period.saturating_sub(1))
            .max(self.slope_window.saturating_sub(1))
    }
}

/// A price bar augmented with its derived indicator values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
    pub volume_oscillator: f64,
    pub volume_skew_ratio: f64,
    pub slope_pct: f64,
    pub composite_score: f64,
}

impl IndicatorRow {
    fn is_complete(&self) -> bool {
        self.volume_oscillator.is_finite()
            && self.volume_skew_ratio.is_finite()
            && self.slope_pct.is_finite()
            && self.composite_score.is_finite()
    }
}

/// Fixed-weight blend of slope and the two volume measures.
pub fn composite_score(slope_pct: f64, volume_oscillator: f64, volume_skew_ratio: f64) -> f64 {
    let (ws, wo, wv) = SCORE_WEIGHTS;
    ws * slope_pct + wo * volume_oscillator + wv * volume_skew_ratio
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    rows: Vec<IndicatorRow>,
    /// Leading bars dropped for insufficient history.
    dropped: usize,
}

impl IndicatorFrame {
    /// Build with the default indicator windows.
    pub fn build(bars: &[PriceBar]) -> Result<Self, FrameError> {
        Self::build_with(bars, &FrameSpec::default())
    }

    pub fn build_with(bars: &[PriceBar], spec: &FrameSpec) -> Result<Self, FrameError> {
        spec.validate()?;
        validate_bars(bars)?;
        if bars.len() <= spec.warmup() {
            return Ok(Self {
                rows: Vec::new(),
                dropped: bars.len(),
            });
        }

        let pvo = VolumeOscillator::new(spec.pvo_fast, spec.pvo_slow).compute(bars);
        let vri = VolumeSkewRatio::new(spec.vri_period).compute(bars);
        let slope = SlopePct::new(spec.slope_window).compute(bars);

        let rows: Vec<IndicatorRow> = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| IndicatorRow {
                date: bar.date,
                close: bar.close,
                volume: bar.volume,
                volume_oscillator: pvo[i],
                volume_skew_ratio: vri[i],
                slope_pct: slope[i],
                composite_score: composite_score(slope[i], pvo[i], vri[i]),
            })
            .skip_while(|row| !row.is_complete())
            .collect();

        Ok(Self {
            dropped: bars.len() - rows.len(),
            rows,
        })
    }

    pub fn rows(&self) -> &[IndicatorRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&IndicatorRow> {
        self.rows.get(index)
    }

    pub fn last(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn slope_series(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.slope_pct).collect()
    }

    pub fn score_series(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.composite_score).collect()
    }
}

fn validate_bars(bars: &[PriceBar]) -> Result<(), FrameError> {
    for bar in bars {
        if !bar.close.is_finite() || bar.close < 0.0 {
            return Err(FrameError::InvalidClose {
                date: bar.date,
                close: bar.close,
            });
        }
    }
    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(FrameError::Unordered {
                previous: pair[0].date,
                current: pair[1].date,
            });
        }
    }
    Ok(())
}
