//! PriceBar: one trading day of close/volume for one instrument.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily close and volume for a single symbol.
///
/// Closes are split/dividend adjusted by the provider. Bars are immutable once
/// ingested; a series is ascending by date with one bar per trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, close: f64, volume: u64) -> Self {
        Self {
            date,
            close,
            volume,
        }
    }

    /// Returns true if the close is missing (NaN) or infinite.
    pub fn is_void(&self) -> bool {
        !self.close.is_finite()
    }

    /// A usable bar has a finite, strictly positive close.
    pub fn is_sane(&self) -> bool {
        !self.is_void() && self.close > 0.0
    }
}
