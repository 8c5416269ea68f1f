//! Short-window price slope as a percentage of the window's first close.
//!
//! Fits y = a + b*x by ordinary least squares over the last `window` closes
//! against x = 0..window-1, then reports 100 * b / y[0]. A zero first close
//! divides by 1 instead. Lookback: window - 1.

use super::Indicator;
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct SlopePct {
    window: usize,
    name: String,
}

impl SlopePct {
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "slope window must be >= 2");
        Self {
            window,
            name: format!("slope_pct_{window}"),
        }
    }
}

impl Default for SlopePct {
    fn default() -> Self {
        Self::new(5)
    }
}

/// OLS slope of `y` against its indices. Returns 0.0 for fewer than two points.
pub fn ols_slope(y: &[f64]) -> f64 {
    let n = y.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = y.iter().sum::<f64>() / n as f64;
    let (sxy, sxx) = y
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (i, &yi)| {
            let dx = i as f64 - x_mean;
            (sxy + dx * (yi - y_mean), sxx + dx * dx)
        });
    sxy / sxx
}

/// Slope percentage of one window of closes.
pub fn slope_pct_of_window(closes: &[f64]) -> f64 {
    let Some(&first) = closes.first() else {
        return 0.0;
    };
    let base = if first != 0.0 { first } else { 1.0 };
    100.0 * ols_slope(closes) / base
}

impl Indicator for SlopePct {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let mut out = vec![f64::NAN; closes.len()];
        for (end, slot) in out.iter_mut().enumerate().skip(self.window - 1) {
            *slot = slope_pct_of_window(&closes[end + 1 - self.window..=end]);
        }
        out
    }
}
