//! Property tests for backtest summaries over arbitrary trade ledgers.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use slopescan_core::domain::{ExitReason, MarketState, TradeRecord};
use slopescan_runner::metrics::{max_drawdown, BacktestSummary};

fn trade(i: usize, return_pct: f64, holding_days: usize, forced: bool) -> TradeRecord {
    let entry = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(i as u64 * 30);
    TradeRecord {
        symbol: "PROP".into(),
        entry_index: i * 30,
        entry_date: entry,
        entry_price: 100.0,
        entry_state: MarketState::StrongBuy,
        exit_index: i * 30 + holding_days - 1,
        exit_date: entry + Days::new(holding_days as u64 - 1),
        exit_price: 100.0 * (1.0 + return_pct / 100.0),
        exit_reason: if forced {
            ExitReason::EndOfData
        } else {
            ExitReason::NeutralStreak
        },
        holding_days,
        return_pct,
        days_to_plus_10: None,
        days_to_plus_20: None,
        days_to_minus_10: None,
        peak_return_pct: return_pct.max(0.0),
        trough_return_pct: return_pct.min(0.0),
    }
}

fn ledger() -> impl Strategy<Value = Vec<TradeRecord>> {
    prop::collection::vec((-60.0f64..150.0, 1usize..25, any::<bool>()), 0..40).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (r, h, f))| trade(i, r, h, f))
            .collect()
    })
}

proptest! {
    #[test]
    fn summary_bounds(trades in ledger()) {
        let s = BacktestSummary::compute(&trades);
        prop_assert_eq!(s.trade_count, trades.len());
        prop_assert_eq!(s.equity_curve.len(), trades.len() + 1);
        prop_assert_eq!(s.equity_curve[0], 1.0);
        prop_assert!((0.0..=1.0).contains(&s.win_rate));
        prop_assert!(s.max_drawdown <= 0.0 && s.max_drawdown > -1.0);
        prop_assert!(s.min_return_pct <= s.mean_return_pct + 1e-9);
        prop_assert!(s.mean_return_pct <= s.max_return_pct + 1e-9);
        prop_assert!(s.forced_closes <= s.trade_count);
    }

    #[test]
    fn combined_equals_single_for_chronological_ledger(trades in ledger()) {
        let single = BacktestSummary::compute(&trades);
        let combined = BacktestSummary::compute_combined(trades.iter());
        prop_assert_eq!(single, combined);
    }

    #[test]
    fn drawdown_never_positive(curve in prop::collection::vec(0.01f64..10.0, 0..60)) {
        prop_assert!(max_drawdown(&curve) <= 0.0);
    }
}
