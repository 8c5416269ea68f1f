//! Market-state labels produced by the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete per-day market state.
///
/// Derived from the normalized indicator frame; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketState {
    StrongBuy,
    TrendHold,
    WatchBullish,
    PrepareReverse,
    NeutralWait,
    WatchBearish,
    ShortEntry,
    BearTrend,
}

impl MarketState {
    pub const ALL: [MarketState; 8] = [
        MarketState::StrongBuy,
        MarketState::TrendHold,
        MarketState::WatchBullish,
        MarketState::PrepareReverse,
        MarketState::NeutralWait,
        MarketState::WatchBearish,
        MarketState::ShortEntry,
        MarketState::BearTrend,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketState::StrongBuy => "strong_buy",
            MarketState::TrendHold => "trend_hold",
            MarketState::WatchBullish => "watch_bullish",
            MarketState::PrepareReverse => "prepare_reverse",
            MarketState::NeutralWait => "neutral_wait",
            MarketState::WatchBearish => "watch_bearish",
            MarketState::ShortEntry => "short_entry",
            MarketState::BearTrend => "bear_trend",
        }
    }

    /// Labels that count toward the consecutive-neutral exit counter.
    ///
    /// In full mode `WatchBearish` sits below the reversal z, so only the
    /// baseline tiers (slope_z in [-1.0, -0.3)) reach the counter with it.
    pub fn is_neutral(&self) -> bool {
        matches!(self, MarketState::NeutralWait | MarketState::WatchBearish)
    }

    /// Labels that close an open long position immediately.
    pub fn is_reversal(&self) -> bool {
        matches!(self, MarketState::ShortEntry | MarketState::BearTrend)
    }

    /// Labels on the bullish side of the tree.
    pub fn is_bullish(&self) -> bool {
        matches!(
            self,
            MarketState::StrongBuy
                | MarketState::TrendHold
                | MarketState::WatchBullish
                | MarketState::PrepareReverse
        )
    }
}

impl fmt::Display for MarketState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse trading direction used for the onset lookback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
    Wait,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::Long => "Long",
            Direction::Short => "Short",
            Direction::Wait => "Wait",
        };
        f.write_str(s)
    }
}
