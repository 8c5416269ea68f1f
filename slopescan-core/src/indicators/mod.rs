//! Concrete indicator implementations.
//!
//! Each indicator maps a bar series to a numeric series of the same length.
//! The first `lookback()` values are `f64::NAN` (warm-up); the frame builder
//! drops those rows rather than zero-filling them.

pub mod ema;
pub mod pvo;
pub mod slope;
pub mod sma;
pub mod vri;

pub use ema::ema_of_series;
pub use pvo::VolumeOscillator;
pub use slope::{ols_slope, slope_pct_of_window, SlopePct};
pub use sma::sma_of_series;
pub use vri::VolumeSkewRatio;

use crate::domain::PriceBar;

/// Additive guard for ratio denominators that can legitimately be zero.
pub const EPSILON: f64 = 1e-6;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on data from bar t+1 or later. Every
/// indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "pvo_12_26", "slope_pct_5").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[PriceBar]) -> Vec<f64>;
}

pub(crate) fn volumes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume as f64).collect()
}

/// Create synthetic bars from closes and volumes for testing.
#[cfg(test)]
pub fn make_bars(closes: &[f64], volumes: &[u64]) -> Vec<PriceBar> {
    assert_eq!(closes.len(), volumes.len());
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            PriceBar::new(base_date + chrono::Duration::days(i as i64), close, volume)
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-9;
