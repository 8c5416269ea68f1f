//! Exponential moving average over an arbitrary series.
//!
//! EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: EMA[span-1] = SMA of the first `span` values, so nothing before the
//! seed window leaks into the output. Lookback: span - 1.

/// Compute EMA values for `values` with the given span.
///
/// NaN inside the seed window yields an all-NaN result; NaN after the seed
/// taints every later value.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if span == 0 || n < span {
        return out;
    }

    let seed_window = &values[..span];
    if seed_window.iter().any(|v| v.is_nan()) {
        return out;
    }
    let mut prev = seed_window.iter().sum::<f64>() / span as f64;
    out[span - 1] = prev;

    let alpha = 2.0 / (span as f64 + 1.0);
    for (i, &v) in values.iter().enumerate().skip(span) {
        if v.is_nan() {
            break;
        }
        prev = alpha * v + (1.0 - alpha) * prev;
        out[i] = prev;
    }
    out
}
