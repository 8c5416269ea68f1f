//! Taiwan listing resolution.
//!
//! Watch lists hold bare stock codes. A purely numeric code is listed either
//! on TWSE (`.TW`) or TPEx (`.TWO`); the first suffix that returns any recent
//! bar wins. Anything else is already a full ticker and passes through.

use super::provider::DataProvider;
use chrono::{Days, NaiveDate};

pub const TWSE_SUFFIX: &str = ".TW";
pub const TPEX_SUFFIX: &str = ".TWO";

/// Calendar days probed for a recent bar.
pub const PROBE_DAYS: u64 = 10;

/// Strip `$` and whitespace from a raw watch-list entry.
pub fn clean_code(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '$' && !c.is_whitespace())
        .collect()
}

fn is_numeric_code(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_digit())
}

/// Resolve a watch-list entry to a provider ticker.
///
/// Provider errors during probing are treated as "not listed here"; if no
/// suffix answers, the TWSE ticker is returned and the caller's fetch
/// reports the failure.
pub fn resolve_listing(provider: &dyn DataProvider, raw: &str, as_of: NaiveDate) -> String {
    let code = clean_code(raw);
    if !is_numeric_code(&code) {
        return code;
    }
    let start = as_of.checked_sub_days(Days::new(PROBE_DAYS)).unwrap_or(as_of);
    [TWSE_SUFFIX, TPEX_SUFFIX]
        .iter()
        .map(|suffix| format!("{code}{suffix}"))
        .find(|ticker| {
            provider
                .fetch(ticker, start, as_of)
                .map(|r| !r.bars.is_empty())
                .unwrap_or(false)
        })
        .unwrap_or_else(|| format!("{code}{TWSE_SUFFIX}"))
}
