//! Simple moving average over an arbitrary series.
//!
//! Rolling mean over a trailing window. Lookback: period - 1.

/// Rolling mean of `values` over `period`.
///
/// Any NaN inside a window makes that window's output NaN.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if period == 0 || n < period {
        return out;
    }

    for end in (period - 1)..n {
        let window = &values[end + 1 - period..=end];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[end] = window.iter().sum::<f64>() / period as f64;
    }
    out
}
