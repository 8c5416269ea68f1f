//! Market-state classification.
//!
//! A layered threshold cascade over the day's z-scores, volume skew ratio,
//! oscillator delta and three-day slope direction. The long gate is
//! evaluated first and selects the bullish or the neutral/bearish subtree;
//! within a subtree the first matching rule wins.
//!
//! Everything here is a pure function of the normalized frame up to and
//! including the evaluated index. The onset lookback calls the same
//! per-index function as live classification.

use crate::domain::{Direction, MarketState};
use crate::normalize::NormalizedFrame;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Long gate: slope_z above this alone qualifies.
pub const LONG_GATE_Z: f64 = 0.6;
/// Bullish subtree: strong tier above this.
pub const STRONG_Z: f64 = 1.5;
/// Bullish subtree: holding tier above this.
pub const HOLD_Z: f64 = 0.5;
/// Bearish subtree and reversal exits below this.
pub const BEARISH_Z: f64 = -1.0;
/// Oscillator delta that upgrades the strong tier to a buy.
pub const IGNITION_DELTA: f64 = 5.0;
/// Oscillator delta below this marks fading volume in the holding tier.
pub const FADING_DELTA: f64 = -2.0;
/// Volume skew ratio above this marks a crowded tape.
pub const CROWDED_VRI: f64 = 90.0;
/// Coarse short gate on the composite score.
pub const SHORT_SCORE_Z: f64 = -0.8;
/// Baseline mode: weak-bullish and weak-bearish wait band.
pub const BASELINE_WAIT_Z: f64 = 0.3;

/// Default bounded lookback for the direction onset scan.
pub const DEFAULT_ONSET_LOOKBACK: usize = 150;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierMode {
    /// Eight-state decision tree.
    #[default]
    Full,
    /// Slope-z tiers only, no volume refinement.
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub mode: ClassifierMode,
    pub onset_lookback: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::Full,
            onset_lookback: DEFAULT_ONSET_LOOKBACK,
        }
    }
}

/// The branch of the cascade that produced a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Ignition,
    StrongBullish,
    Crowded,
    Holding,
    EarlyReversal,
    BearishCurlingUp,
    Bearish,
    Neutral,
    Baseline,
}

impl Rule {
    pub fn describe(&self) -> &'static str {
        match self {
            Rule::Ignition => "strong bullish, volume igniting",
            Rule::StrongBullish => "strong bullish",
            Rule::Crowded => "bullish but crowded",
            Rule::Holding => "holding",
            Rule::EarlyReversal => "early reversal to bullish",
            Rule::BearishCurlingUp => "bearish but curling up",
            Rule::Bearish => "bearish",
            Rule::Neutral => "neutral",
            Rule::Baseline => "baseline tier",
        }
    }
}

/// Per-day classifier inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierInputs {
    pub slope_z: f64,
    pub score_z: f64,
    pub volume_skew_ratio: f64,
    /// volume_oscillator[t] - volume_oscillator[t-1]; 0 on the first row.
    pub volume_osc_delta: f64,
    /// slope_pct[t] > slope_pct[t-1] > slope_pct[t-2]; false without history.
    pub slope_rising_3d: bool,
}

impl ClassifierInputs {
    /// Gather inputs for `index`, or `None` if it is out of range.
    pub fn at(frame: &NormalizedFrame, index: usize) -> Option<Self> {
        let rows = frame.rows();
        let today = rows.get(index)?;
        let prev = index.checked_sub(1).map(|i| &rows[i]);
        let prev2 = index.checked_sub(2).map(|i| &rows[i]);

        let volume_osc_delta = prev
            .map(|p| today.row.volume_oscillator - p.row.volume_oscillator)
            .unwrap_or(0.0);
        let slope_rising_3d = match (prev, prev2) {
            (Some(p1), Some(p2)) => {
                today.row.slope_pct > p1.row.slope_pct && p1.row.slope_pct > p2.row.slope_pct
            }
            _ => false,
        };

        Some(Self {
            slope_z: today.slope_z,
            score_z: today.score_z,
            volume_skew_ratio: today.row.volume_skew_ratio,
            volume_osc_delta,
            slope_rising_3d,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub state: MarketState,
    pub rule: Rule,
}

/// Classify one day. Pure: identical inputs always give the same label.
pub fn classify(inputs: &ClassifierInputs, mode: ClassifierMode) -> MarketState {
    evaluate(inputs, mode).state
}

/// Classify one day and report which rule fired.
pub fn evaluate(inputs: &ClassifierInputs, mode: ClassifierMode) -> Classification {
    match mode {
        ClassifierMode::Full => evaluate_full(inputs),
        ClassifierMode::Baseline => Classification {
            state: baseline_state(inputs.slope_z),
            rule: Rule::Baseline,
        },
    }
}

fn evaluate_full(inp: &ClassifierInputs) -> Classification {
    let (state, rule) = if is_long(inp) {
        if inp.slope_z > STRONG_Z {
            if inp.volume_osc_delta > IGNITION_DELTA {
                (MarketState::StrongBuy, Rule::Ignition)
            } else {
                (MarketState::TrendHold, Rule::StrongBullish)
            }
        } else if inp.slope_z > HOLD_Z {
            if inp.volume_skew_ratio > CROWDED_VRI || inp.volume_osc_delta < FADING_DELTA {
                (MarketState::WatchBullish, Rule::Crowded)
            } else {
                (MarketState::TrendHold, Rule::Holding)
            }
        } else {
            (MarketState::PrepareReverse, Rule::EarlyReversal)
        }
    } else if inp.slope_z < BEARISH_Z {
        if inp.slope_rising_3d {
            (MarketState::WatchBearish, Rule::BearishCurlingUp)
        } else {
            (MarketState::BearTrend, Rule::Bearish)
        }
    } else {
        (MarketState::NeutralWait, Rule::Neutral)
    };
    Classification { state, rule }
}

fn baseline_state(slope_z: f64) -> MarketState {
    if slope_z > STRONG_Z {
        MarketState::StrongBuy
    } else if slope_z > HOLD_Z {
        MarketState::TrendHold
    } else if slope_z > BASELINE_WAIT_Z {
        MarketState::WatchBullish
    } else if slope_z < BEARISH_Z {
        MarketState::ShortEntry
    } else if slope_z < -BASELINE_WAIT_Z {
        MarketState::WatchBearish
    } else {
        MarketState::NeutralWait
    }
}

fn is_long(inp: &ClassifierInputs) -> bool {
    inp.slope_z > LONG_GATE_Z || (inp.slope_rising_3d && inp.score_z > 0.0)
}

/// Coarse direction used by the onset scan.
pub fn direction_gate(inp: &ClassifierInputs) -> Direction {
    if is_long(inp) {
        Direction::Long
    } else if inp.slope_z < BEARISH_Z || (!inp.slope_rising_3d && inp.score_z < SHORT_SCORE_Z) {
        Direction::Short
    } else {
        Direction::Wait
    }
}

/// One classified frame row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedDay {
    pub index: usize,
    pub date: NaiveDate,
    pub close: f64,
    pub state: MarketState,
    pub rule: Rule,
    pub direction: Direction,
    pub slope_z: f64,
    pub score_z: f64,
}

/// Classify a single frame index.
pub fn classify_at(
    frame: &NormalizedFrame,
    index: usize,
    mode: ClassifierMode,
) -> Option<ClassifiedDay> {
    let inputs = ClassifierInputs::at(frame, index)?;
    let row = frame.get(index)?;
    let Classification { state, rule } = evaluate(&inputs, mode);
    Some(ClassifiedDay {
        index,
        date: row.row.date,
        close: row.row.close,
        state,
        rule,
        direction: direction_gate(&inputs),
        slope_z: inputs.slope_z,
        score_z: inputs.score_z,
    })
}

/// Classify every row of the frame in date order.
pub fn classify_all(frame: &NormalizedFrame, mode: ClassifierMode) -> Vec<ClassifiedDay> {
    (0..frame.len())
        .filter_map(|i| classify_at(frame, i, mode))
        .collect()
}

/// When the current direction began, within a bounded lookback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionOnset {
    pub direction: Direction,
    /// Earliest date of the unbroken run, if it started before today.
    pub since: Option<NaiveDate>,
    /// Length of the run in trading days, today included.
    pub span_days: usize,
}

impl fmt::Display for DirectionOnset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.direction, self.since) {
            (Direction::Wait, _) => f.write_str("---"),
            (dir, Some(date)) => write!(f, "{} {dir}", date.format("%m/%d")),
            (dir, None) => write!(f, "today {dir}"),
        }
    }
}

/// Scan backward from `index` while the direction gate is unchanged.
///
/// At most `lookback - 1` prior days are inspected, and never a day whose
/// normalization window is incomplete (index below the frame's window).
pub fn direction_onset(
    frame: &NormalizedFrame,
    index: usize,
    lookback: usize,
) -> Option<DirectionOnset> {
    let today = ClassifierInputs::at(frame, index)?;
    let direction = direction_gate(&today);
    let mut onset = DirectionOnset {
        direction,
        since: None,
        span_days: 1,
    };
    if direction == Direction::Wait {
        return Some(onset);
    }

    let floor = frame.window().max(2);
    for offset in 1..lookback {
        let Some(p) = index.checked_sub(offset) else {
            break;
        };
        if p < floor {
            break;
        }
        match ClassifierInputs::at(frame, p) {
            Some(inputs) if direction_gate(&inputs) == direction => {
                onset.since = frame.get(p).map(|r| r.row.date);
                onset.span_days += 1;
            }
            _ => break,
        }
    }
    Some(onset)
}
