//! Rolling z-scores of slope% and composite score.
//!
//! For day t the window is values[t-W..=t] (fewer at the start of the
//! frame), using the population standard deviation plus ε in the
//! denominator. Every day's z-score is computed from its own trailing
//! window only, so the value at t is identical whether it is evaluated for
//! the latest day or inside a historical scan.

use crate::frame::{IndicatorFrame, IndicatorRow};
use serde::{Deserialize, Serialize};

/// Default trailing window length W.
pub const DEFAULT_WINDOW: usize = 60;

/// Additive guard on the standard deviation.
pub const Z_EPSILON: f64 = 1e-6;

/// Population mean and standard deviation (ddof = 0).
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// z-score of `values[index]` against `values[index-window..=index]`.
///
/// Panics if `index` is out of bounds.
pub fn rolling_zscore_at(values: &[f64], index: usize, window: usize) -> f64 {
    let start = index.saturating_sub(window);
    let (mean, std) = mean_std(&values[start..=index]);
    (values[index] - mean) / (std + Z_EPSILON)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZScores {
    pub slope_z: f64,
    pub score_z: f64,
}

/// A frame row plus its z-scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRow {
    #[serde(flatten)]
    pub row: IndicatorRow,
    pub slope_z: f64,
    pub score_z: f64,
}

impl NormalizedRow {
    pub fn zscores(&self) -> ZScores {
        ZScores {
            slope_z: self.slope_z,
            score_z: self.score_z,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFrame {
    rows: Vec<NormalizedRow>,
    window: usize,
}

impl NormalizedFrame {
    pub fn new(frame: &IndicatorFrame, window: usize) -> Self {
        let slopes = frame.slope_series();
        let scores = frame.score_series();
        let rows = frame
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| NormalizedRow {
                row: *row,
                slope_z: rolling_zscore_at(&slopes, i, window),
                score_z: rolling_zscore_at(&scores, i, window),
            })
            .collect();
        Self { rows, window }
    }

    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&NormalizedRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }
}
