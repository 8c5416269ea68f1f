//! Entry and exit rules for the single-position long backtest.

use crate::classify::BEARISH_Z;
use crate::domain::MarketState;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("entry_states must name at least one state")]
    NoEntryStates,

    #[error("entry state {0} is also a reversal exit label")]
    ReversalEntryState(MarketState),

    #[error("max_holding_days must be positive when set")]
    ZeroMaxHolding,
}

/// Backtest rules.
///
/// Exit checks run in order: reversal, neutral streak, holding cap. The
/// first that fires closes the position at that day's close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestPolicy {
    /// Labels that open a position while flat.
    pub entry_states: Vec<MarketState>,
    /// Consecutive neutral days that close a position. 0 disables the rule.
    pub neutral_exit_days: usize,
    /// Holding-period cap in trading days, entry day included.
    pub max_holding_days: Option<usize>,
    /// slope_z below this forces a reversal exit whatever the label.
    pub reversal_z: f64,
}

impl Default for BacktestPolicy {
    fn default() -> Self {
        Self {
            entry_states: vec![MarketState::StrongBuy],
            neutral_exit_days: 5,
            max_holding_days: Some(120),
            reversal_z: BEARISH_Z,
        }
    }
}

impl BacktestPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.entry_states.is_empty() {
            return Err(PolicyError::NoEntryStates);
        }
        if let Some(state) = self.entry_states.iter().find(|s| s.is_reversal()) {
            return Err(PolicyError::ReversalEntryState(*state));
        }
        if self.max_holding_days == Some(0) {
            return Err(PolicyError::ZeroMaxHolding);
        }
        Ok(())
    }

    pub fn is_entry(&self, state: MarketState) -> bool {
        self.entry_states.contains(&state)
    }
}
