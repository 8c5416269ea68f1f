//! Single-position long simulation over a classified day sequence.
//!
//! At most one position per instrument. While flat, a day whose label is in
//! the policy's entry set opens a position at that day's close; the entry day
//! is holding day 1 and is never checked for exit. Each later day updates the
//! unrealized return and milestones, then runs the exit checks. A position
//! closed on day t cannot be reopened on day t. A position still open after
//! the last day is marked to the last close.

use super::policy::BacktestPolicy;
use crate::classify::ClassifiedDay;
use crate::domain::trade::return_pct;
use crate::domain::{ExitReason, MarketState, TradeRecord};
use chrono::NaiveDate;

/// Unrealized return thresholds, in percent.
pub const PLUS_10: f64 = 10.0;
pub const PLUS_20: f64 = 20.0;
pub const MINUS_10: f64 = -10.0;

#[derive(Debug, Clone)]
struct OpenPosition {
    entry_index: usize,
    entry_date: NaiveDate,
    entry_price: f64,
    entry_state: MarketState,
    holding_days: usize,
    neutral_streak: usize,
    days_to_plus_10: Option<usize>,
    days_to_plus_20: Option<usize>,
    days_to_minus_10: Option<usize>,
    peak_return_pct: f64,
    trough_return_pct: f64,
}

impl OpenPosition {
    fn open(day: &ClassifiedDay) -> Self {
        Self {
            entry_index: day.index,
            entry_date: day.date,
            entry_price: day.close,
            entry_state: day.state,
            holding_days: 1,
            neutral_streak: 0,
            days_to_plus_10: None,
            days_to_plus_20: None,
            days_to_minus_10: None,
            peak_return_pct: 0.0,
            trough_return_pct: 0.0,
        }
    }

    /// Advance one held day and record first milestone crossings.
    fn mark(&mut self, day: &ClassifiedDay) {
        self.holding_days += 1;
        let ret = return_pct(self.entry_price, day.close);
        self.peak_return_pct = self.peak_return_pct.max(ret);
        self.trough_return_pct = self.trough_return_pct.min(ret);

        let held = self.holding_days;
        if ret >= PLUS_10 {
            self.days_to_plus_10.get_or_insert(held);
        }
        if ret >= PLUS_20 {
            self.days_to_plus_20.get_or_insert(held);
        }
        if ret <= MINUS_10 {
            self.days_to_minus_10.get_or_insert(held);
        }

        if day.state.is_neutral() {
            self.neutral_streak += 1;
        } else {
            self.neutral_streak = 0;
        }
    }

    fn exit_reason(&self, day: &ClassifiedDay, policy: &BacktestPolicy) -> Option<ExitReason> {
        if day.state.is_reversal() || day.slope_z < policy.reversal_z {
            return Some(ExitReason::Reversal);
        }
        if policy.neutral_exit_days > 0 && self.neutral_streak >= policy.neutral_exit_days {
            return Some(ExitReason::NeutralStreak);
        }
        match policy.max_holding_days {
            Some(cap) if self.holding_days >= cap => Some(ExitReason::MaxHolding),
            _ => None,
        }
    }

    fn close(self, symbol: &str, day: &ClassifiedDay, reason: ExitReason) -> TradeRecord {
        TradeRecord {
            symbol: symbol.to_string(),
            entry_index: self.entry_index,
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            entry_state: self.entry_state,
            exit_index: day.index,
            exit_date: day.date,
            exit_price: day.close,
            exit_reason: reason,
            holding_days: self.holding_days,
            return_pct: return_pct(self.entry_price, day.close),
            days_to_plus_10: self.days_to_plus_10,
            days_to_plus_20: self.days_to_plus_20,
            days_to_minus_10: self.days_to_minus_10,
            peak_return_pct: self.peak_return_pct,
            trough_return_pct: self.trough_return_pct,
        }
    }
}

enum PositionState {
    Flat,
    InTrade(OpenPosition),
}

/// Simulate the policy over `days` (ascending) and return closed trades in
/// chronological order.
pub fn run_backtest(symbol: &str, days: &[ClassifiedDay], policy: &BacktestPolicy) -> Vec<TradeRecord> {
    let mut trades = Vec::new();
    let mut state = PositionState::Flat;

    for day in days {
        state = match state {
            PositionState::Flat if policy.is_entry(day.state) => {
                PositionState::InTrade(OpenPosition::open(day))
            }
            PositionState::Flat => PositionState::Flat,
            PositionState::InTrade(mut pos) => {
                pos.mark(day);
                match pos.exit_reason(day, policy) {
                    Some(reason) => {
                        trades.push(pos.close(symbol, day, reason));
                        PositionState::Flat
                    }
                    None => PositionState::InTrade(pos),
                }
            }
        };
    }

    if let (PositionState::InTrade(pos), Some(last)) = (state, days.last()) {
        trades.push(pos.close(symbol, last, ExitReason::EndOfData));
    }

    trades
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, ClassifierInputs, ClassifierMode, Rule};
    use crate::domain::Direction;
    use MarketState::*;

    fn day(index: usize, close: f64, state: MarketState, slope_z: f64) -> ClassifiedDay {
        ClassifiedDay {
            index,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(index as u64),
            close,
            state,
            rule: Rule::Neutral,
            direction: Direction::Wait,
            slope_z,
            score_z: 0.0,
        }
    }

    fn seq(spec: &[(f64, MarketState)]) -> Vec<ClassifiedDay> {
        spec.iter()
            .enumerate()
            .map(|(i, &(close, state))| {
                let z = if state.is_reversal() { -1.5 } else { 0.0 };
                day(i, close, state, z)
            })
            .collect()
    }

    #[test]
    fn no_days_no_trades() {
        assert!(run_backtest("X", &[], &BacktestPolicy::default()).is_empty());
    }

    #[test]
    fn entry_then_reversal() {
        let days = seq(&[
            (100.0, NeutralWait),
            (100.0, StrongBuy),
            (111.0, TrendHold),
            (121.0, TrendHold),
            (115.0, BearTrend),
            (110.0, StrongBuy),
        ]);
        let trades = run_backtest("X", &days, &BacktestPolicy::default());
        assert_eq!(trades.len(), 2);

        let t = &trades[0];
        assert_eq!(t.entry_index, 1);
        assert_eq!(t.exit_index, 4);
        assert_eq!(t.exit_reason, ExitReason::Reversal);
        assert_eq!(t.holding_days, 4);
        assert_eq!(t.days_to_plus_10, Some(2));
        assert_eq!(t.days_to_plus_20, Some(3));
        assert_eq!(t.days_to_minus_10, None);
        assert!((t.return_pct - 15.0).abs() < 1e-9);
        assert!((t.peak_return_pct - 21.0).abs() < 1e-9);
        assert_eq!(t.trough_return_pct, 0.0);

        // re-entry on the last day, closed at end of data
        let last = &trades[1];
        assert_eq!(last.entry_index, 5);
        assert_eq!(last.exit_index, 5);
        assert_eq!(last.holding_days, 1);
        assert_eq!(last.exit_reason, ExitReason::EndOfData);
        assert_eq!(last.return_pct, 0.0);
    }

    #[test]
    fn slope_z_alone_triggers_reversal() {
        let mut days = seq(&[(100.0, StrongBuy), (101.0, TrendHold), (99.0, WatchBullish)]);
        days[2].slope_z = -1.2;
        let trades = run_backtest("X", &days, &BacktestPolicy::default());
        assert_eq!(trades[0].exit_reason, ExitReason::Reversal);
        assert_eq!(trades[0].exit_index, 2);
    }

    #[test]
    fn entry_day_is_never_exited() {
        let mut days = seq(&[(100.0, StrongBuy), (100.0, TrendHold)]);
        days[0].slope_z = -3.0;
        let trades = run_backtest("X", &days, &BacktestPolicy::default());
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].exit_reason, ExitReason::EndOfData);
        assert_eq!(trades[0].holding_days, 2);
    }

    #[test]
    fn no_reentry_on_exit_day() {
        // exit by slope_z while labelled StrongBuy, then StrongBuy again next day
        let mut days = seq(&[(100.0, StrongBuy), (89.0, StrongBuy), (95.0, StrongBuy)]);
        days[1].slope_z = -2.0;
        let trades = run_backtest("X", &days, &BacktestPolicy::default());
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].exit_index, 1);
        assert_eq!(trades[0].days_to_minus_10, Some(2));
        assert_eq!(trades[1].entry_index, 2);
    }

    #[test]
    fn neutral_streak_exit_and_reset() {
        let mut spec = vec![(100.0, StrongBuy)];
        spec.extend([(100.0, NeutralWait); 4]);
        spec.push((100.0, WatchBullish)); // breaks the streak
        spec.extend([(100.0, WatchBearish); 4]);
        spec.push((100.0, NeutralWait)); // fifth consecutive neutral
        spec.push((100.0, TrendHold));
        let trades = run_backtest("X", &seq(&spec), &BacktestPolicy::default());
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].exit_reason, ExitReason::NeutralStreak);
        assert_eq!(trades[0].exit_index, 10);
        assert_eq!(trades[0].holding_days, 11);
    }

    #[test]
    fn baseline_watch_bearish_counts_as_neutral() {
        let weak = ClassifierInputs {
            slope_z: -0.5,
            score_z: 0.0,
            volume_skew_ratio: 50.0,
            volume_osc_delta: 0.0,
            slope_rising_3d: false,
        };
        assert_eq!(classify(&weak, ClassifierMode::Baseline), WatchBearish);
        assert_eq!(classify(&weak, ClassifierMode::Full), NeutralWait);

        let mut days = vec![day(0, 100.0, StrongBuy, 2.0)];
        days.extend((1..=6).map(|i| day(i, 98.0, WatchBearish, weak.slope_z)));
        let trades = run_backtest("X", &days, &BacktestPolicy::default());
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].exit_reason, ExitReason::NeutralStreak);
        assert_eq!(trades[0].exit_index, 5);
    }

    #[test]
    fn neutral_exit_disabled_with_zero() {
        let mut spec = vec![(100.0, StrongBuy)];
        spec.extend([(100.0, NeutralWait); 20]);
        let policy = BacktestPolicy {
            neutral_exit_days: 0,
            ..Default::default()
        };
        let trades = run_backtest("X", &seq(&spec), &policy);
        assert_eq!(trades[0].exit_reason, ExitReason::EndOfData);
    }

    #[test]
    fn holding_cap() {
        let mut spec = vec![(100.0, StrongBuy)];
        spec.extend([(100.0, TrendHold); 6]);
        let policy = BacktestPolicy {
            max_holding_days: Some(3),
            ..Default::default()
        };
        let trades = run_backtest("X", &seq(&spec), &policy);
        assert_eq!(trades[0].exit_reason, ExitReason::MaxHolding);
        assert_eq!(trades[0].holding_days, 3);
        assert_eq!(trades[0].exit_index, 2);
        // flat again, TrendHold is not an entry state
        assert_eq!(trades.len(), 1);
    }

    #[test]
    fn reversal_beats_holding_cap() {
        let spec = [(100.0, StrongBuy), (100.0, TrendHold), (100.0, BearTrend)];
        let policy = BacktestPolicy {
            max_holding_days: Some(3),
            ..Default::default()
        };
        let trades = run_backtest("X", &seq(&spec), &policy);
        assert_eq!(trades[0].exit_reason, ExitReason::Reversal);
    }

    #[test]
    fn milestones_recorded_once() {
        let spec = [
            (100.0, StrongBuy),
            (110.0, TrendHold),
            (100.0, TrendHold),
            (112.0, TrendHold),
            (89.0, TrendHold),
            (85.0, TrendHold),
        ];
        let trades = run_backtest("X", &seq(&spec), &BacktestPolicy::default());
        let t = &trades[0];
        assert_eq!(t.days_to_plus_10, Some(2));
        assert_eq!(t.days_to_minus_10, Some(5));
        assert_eq!(t.days_to_plus_20, None);
        assert!((t.trough_return_pct - (-15.0)).abs() < 1e-9);
    }
}
