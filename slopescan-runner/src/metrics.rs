//! Backtest summary: pure functions over a trade ledger.
//!
//! Every metric is a pure function of the trade list. No dependencies on the
//! runner or the data pipeline.

use serde::{Deserialize, Serialize};
use slopescan_core::domain::TradeRecord;

/// Aggregate statistics for a trade ledger.
///
/// An empty ledger is a valid result: counts and returns are zero and the
/// equity curve is `[1.0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub trade_count: usize,
    /// Fraction of trades with return_pct > 0.
    pub win_rate: f64,
    pub mean_return_pct: f64,
    pub max_return_pct: f64,
    pub min_return_pct: f64,
    /// Compounded return of the equity curve, in percent.
    pub total_return_pct: f64,
    /// Most negative (equity - running max) / running max; 0 when never below peak.
    pub max_drawdown: f64,
    pub avg_holding_days: f64,
    pub hits_plus_10: usize,
    pub hits_plus_20: usize,
    pub hits_minus_10: usize,
    /// Trades still open at the end of the series.
    pub forced_closes: usize,
    /// equity[0] = 1.0, equity[i] = equity[i-1] * (1 + return_pct / 100).
    pub equity_curve: Vec<f64>,
}

impl BacktestSummary {
    /// Summarize trades in the order given.
    pub fn compute(trades: &[TradeRecord]) -> Self {
        let returns: Vec<f64> = trades.iter().map(|t| t.return_pct).collect();
        let equity_curve = equity_curve(&returns);
        Self {
            trade_count: trades.len(),
            win_rate: win_rate(trades),
            mean_return_pct: mean_f64(&returns),
            max_return_pct: returns.iter().copied().reduce(f64::max).unwrap_or(0.0),
            min_return_pct: returns.iter().copied().reduce(f64::min).unwrap_or(0.0),
            total_return_pct: total_return(&equity_curve) * 100.0,
            max_drawdown: max_drawdown(&equity_curve),
            avg_holding_days: mean_f64(
                &trades.iter().map(|t| t.holding_days as f64).collect::<Vec<_>>(),
            ),
            hits_plus_10: trades.iter().filter(|t| t.days_to_plus_10.is_some()).count(),
            hits_plus_20: trades.iter().filter(|t| t.days_to_plus_20.is_some()).count(),
            hits_minus_10: trades.iter().filter(|t| t.days_to_minus_10.is_some()).count(),
            forced_closes: trades.iter().filter(|t| t.is_forced_close()).count(),
            equity_curve,
        }
    }

    /// Summarize trades from several symbols in exit-date order.
    pub fn compute_combined<'a>(trades: impl IntoIterator<Item = &'a TradeRecord>) -> Self {
        let mut all: Vec<TradeRecord> = trades.into_iter().cloned().collect();
        all.sort_by(|a, b| {
            (a.exit_date, a.entry_date, &a.symbol).cmp(&(b.exit_date, b.entry_date, &b.symbol))
        });
        Self::compute(&all)
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Compounded equity from per-trade percent returns, starting at 1.0.
pub fn equity_curve(returns_pct: &[f64]) -> Vec<f64> {
    let mut curve = Vec::with_capacity(returns_pct.len() + 1);
    curve.push(1.0);
    let mut equity = 1.0;
    for r in returns_pct {
        equity *= 1.0 + r / 100.0;
        curve.push(equity);
    }
    curve
}

/// Total return as a fraction: last / first - 1.
pub fn total_return(equity_curve: &[f64]) -> f64 {
    match (equity_curve.first(), equity_curve.last()) {
        (Some(&first), Some(&last)) if first > 0.0 => last / first - 1.0,
        _ => 0.0,
    }
}

/// Maximum drawdown as a negative fraction (e.g. -0.15 for 15% drawdown).
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }
    let mut peak = equity_curve[0];
    let mut max_dd = 0.0_f64;

    for &eq in equity_curve {
        if eq > peak {
            peak = eq;
        }
        if peak > 0.0 {
            max_dd = max_dd.min((eq - peak) / peak);
        }
    }
    max_dd
}

/// Win rate: fraction of trades with a positive return.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use slopescan_core::domain::{ExitReason, MarketState};

    fn make_trade(return_pct: f64, holding_days: usize) -> TradeRecord {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        TradeRecord {
            symbol: "2330.TW".into(),
            entry_index: 0,
            entry_date: d,
            entry_price: 100.0,
            entry_state: MarketState::StrongBuy,
            exit_index: holding_days - 1,
            exit_date: d,
            exit_price: 100.0 + return_pct,
            exit_reason: ExitReason::Reversal,
            holding_days,
            return_pct,
            days_to_plus_10: (return_pct >= 10.0).then_some(2),
            days_to_plus_20: (return_pct >= 20.0).then_some(3),
            days_to_minus_10: (return_pct <= -10.0).then_some(2),
            peak_return_pct: return_pct.max(0.0),
            trough_return_pct: return_pct.min(0.0),
        }
    }

    #[test]
    fn empty_ledger_is_zero_not_error() {
        let s = BacktestSummary::compute(&[]);
        assert_eq!(s.trade_count, 0);
        assert_eq!(s.win_rate, 0.0);
        assert_eq!(s.mean_return_pct, 0.0);
        assert_eq!(s.max_return_pct, 0.0);
        assert_eq!(s.min_return_pct, 0.0);
        assert_eq!(s.total_return_pct, 0.0);
        assert_eq!(s.max_drawdown, 0.0);
        assert_eq!(s.equity_curve, vec![1.0]);
    }

    #[test]
    fn known_ledger() {
        let trades = vec![make_trade(10.0, 4), make_trade(-20.0, 6), make_trade(25.0, 5)];
        let s = BacktestSummary::compute(&trades);
        assert_eq!(s.trade_count, 3);
        assert!((s.win_rate - 2.0 / 3.0).abs() < 1e-12);
        assert!((s.mean_return_pct - 5.0).abs() < 1e-12);
        assert_eq!(s.max_return_pct, 25.0);
        assert_eq!(s.min_return_pct, -20.0);
        assert!((s.avg_holding_days - 5.0).abs() < 1e-12);

        // 1.0 → 1.1 → 0.88 → 1.1
        assert_eq!(s.equity_curve.len(), 4);
        assert!((s.equity_curve[2] - 0.88).abs() < 1e-12);
        assert!((s.total_return_pct - 10.0).abs() < 1e-9);
        assert!((s.max_drawdown - (-0.2)).abs() < 1e-12);

        assert_eq!(s.hits_plus_10, 2);
        assert_eq!(s.hits_plus_20, 1);
        assert_eq!(s.hits_minus_10, 1);
        assert_eq!(s.forced_closes, 0);
    }

    #[test]
    fn combined_sorts_by_exit_date() {
        let mut late = make_trade(-50.0, 3);
        late.exit_date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let mut early = make_trade(100.0, 3);
        early.exit_date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let s = BacktestSummary::compute_combined([&late, &early]);
        // 1.0 → 2.0 → 1.0: drawdown of 50% after the peak
        assert!((s.equity_curve[1] - 2.0).abs() < 1e-12);
        assert!((s.max_drawdown - (-0.5)).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_monotonic_increase() {
        let eq: Vec<f64> = (0..100).map(|i| 1.0 + i as f64 * 0.01).collect();
        assert_eq!(max_drawdown(&eq), 0.0);
    }

    #[test]
    fn total_return_edge_cases() {
        assert_eq!(total_return(&[]), 0.0);
        assert_eq!(total_return(&[1.0]), 0.0);
        assert!((total_return(&[1.0, 1.5]) - 0.5).abs() < 1e-12);
    }
}
