//! Domain types for SlopeScan

pub mod bar;
pub mod state;
pub mod trade;

pub use bar::PriceBar;
pub use state::{Direction, MarketState};
pub use trade::{ExitReason, TradeRecord};
