//! Volume skew ratio (VRI): share of trailing volume traded on up-close days.
//!
//! up_volume[t] = volume[t] if close[t] > close[t-1] else 0 (0 on the first bar)
//! VRI[t] = 100 * SMA_n(up_volume)[t] / (SMA_n(volume)[t] + ε)
//! Lookback: period - 1.

use super::{sma_of_series, volumes, Indicator, EPSILON};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct VolumeSkewRatio {
    period: usize,
    name: String,
}

impl VolumeSkewRatio {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "VRI period must be >= 1");
        Self {
            period,
            name: format!("vri_{period}"),
        }
    }
}

impl Default for VolumeSkewRatio {
    fn default() -> Self {
        Self::new(14)
    }
}

/// Volume on days whose close rose versus the previous close, else 0.
fn up_day_volume(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| match i.checked_sub(1).map(|p| &bars[p]) {
            Some(prev) if bar.close > prev.close => bar.volume as f64,
            _ => 0.0,
        })
        .collect()
}

impl Indicator for VolumeSkewRatio {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let up = sma_of_series(&up_day_volume(bars), self.period);
        let all = sma_of_series(&volumes(bars), self.period);
        up.iter()
            .zip(&all)
            .map(|(u, a)| 100.0 * u / (a + EPSILON))
            .collect()
    }
}
