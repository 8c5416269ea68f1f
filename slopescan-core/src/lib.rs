//! SlopeScan Core: indicators, normalization, classification and backtest.
//!
//! Data flows one way:
//! - bars from a `DataProvider`, cleaned by `data::ingest`
//! - `IndicatorFrame`: PVO, VRI, slope% and the composite score per day
//! - `NormalizedFrame`: trailing-window z-scores of slope% and score
//! - `classify`: one `MarketState` per day plus the direction gate
//! - `backtest`: single-position long simulation with milestones
//!
//! Every stage is a pure function of its input up to the evaluated day.

pub mod backtest;
pub mod classify;
pub mod data;
pub mod domain;
pub mod frame;
pub mod indicators;
pub mod normalize;
