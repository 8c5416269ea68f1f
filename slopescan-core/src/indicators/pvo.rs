//! Percentage Volume Oscillator (PVO).
//!
//! PVO[t] = 100 * (EMA_fast(volume)[t] - EMA_slow(volume)[t]) / (EMA_slow(volume)[t] + ε)
//! Lookback: slow - 1.

use super::{ema_of_series, volumes, Indicator, EPSILON};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct VolumeOscillator {
    fast: usize,
    slow: usize,
    name: String,
}

impl VolumeOscillator {
    pub fn new(fast: usize, slow: usize) -> Self {
        assert!(fast >= 1, "PVO fast span must be >= 1");
        assert!(slow > fast, "PVO slow span must exceed fast span");
        Self {
            fast,
            slow,
            name: format!("pvo_{fast}_{slow}"),
        }
    }
}

impl Default for VolumeOscillator {
    fn default() -> Self {
        Self::new(12, 26)
    }
}

impl Indicator for VolumeOscillator {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.slow - 1
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let vol = volumes(bars);
        let fast = ema_of_series(&vol, self.fast);
        let slow = ema_of_series(&vol, self.slow);
        fast.iter()
            .zip(&slow)
            .map(|(f, s)| 100.0 * (f - s) / (s + EPSILON))
            .collect()
    }
}
