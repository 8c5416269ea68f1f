//! Long-only backtest over classified days.

pub mod engine;
pub mod policy;

pub use engine::run_backtest;
pub use policy::{BacktestPolicy, PolicyError};
