//! Cleaning of provider output before it reaches the indicator frame.
//!
//! Bars are sorted by date and void or non-positive closes are dropped.
//! Of the remaining bars sharing a date, the first received is kept.

use crate::domain::PriceBar;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub bars: Vec<PriceBar>,
    pub duplicates_dropped: usize,
    pub void_dropped: usize,
}

impl IngestReport {
    pub fn dropped(&self) -> usize {
        self.duplicates_dropped + self.void_dropped
    }
}

pub fn ingest(mut bars: Vec<PriceBar>) -> IngestReport {
    // stable: equal dates keep input order, so "first" means first received
    bars.sort_by_key(|b| b.date);

    let mut seen = HashSet::with_capacity(bars.len());
    let mut report = IngestReport::default();
    for bar in bars {
        if !bar.is_sane() {
            report.void_dropped += 1;
        } else if !seen.insert(bar.date) {
            report.duplicates_dropped += 1;
        } else {
            report.bars.push(bar);
        }
    }
    report
}
