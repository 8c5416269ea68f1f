//! TradeRecord: a finalized long round trip from the backtest engine.

use super::state::MarketState;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Bearish label or slope_z below the reversal threshold.
    Reversal,
    /// Too many consecutive neutral days.
    NeutralStreak,
    /// Holding-period safety cap reached.
    MaxHolding,
    /// Series ended with the position open; marked to the last close.
    EndOfData,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Reversal => "reversal",
            ExitReason::NeutralStreak => "neutral_streak",
            ExitReason::MaxHolding => "max_holding",
            ExitReason::EndOfData => "end_of_data",
        }
    }
}

/// A complete simulated long trade: entry → exit.
///
/// `holding_days` counts the entry day as day 1. Milestone fields hold the
/// holding-day count at which the unrealized return first crossed the
/// threshold, or `None` if it never did before exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub symbol: String,

    // ── Entry ──
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub entry_state: MarketState,

    // ── Exit ──
    pub exit_index: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    pub holding_days: usize,
    /// Percent return: 100 * (exit / entry - 1).
    pub return_pct: f64,

    // ── Milestones ──
    pub days_to_plus_10: Option<usize>,
    pub days_to_plus_20: Option<usize>,
    pub days_to_minus_10: Option<usize>,

    // ── Excursion ──
    /// Best unrealized return while held, in percent.
    pub peak_return_pct: f64,
    /// Worst unrealized return while held, in percent.
    pub trough_return_pct: f64,
}

impl TradeRecord {
    pub fn is_winner(&self) -> bool {
        self.return_pct > 0.0
    }

    /// Whether the position was still open when the data ran out.
    pub fn is_forced_close(&self) -> bool {
        self.exit_reason == ExitReason::EndOfData
    }
}

/// Percent return from `entry` to `price`.
pub fn return_pct(entry: f64, price: f64) -> f64 {
    if entry == 0.0 {
        return 0.0;
    }
    100.0 * (price / entry - 1.0)
}
