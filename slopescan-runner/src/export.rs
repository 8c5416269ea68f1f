//! Export: JSON and CSV artifacts for scan reports.
//!
//! - **JSON**: full round-trip serialization of a `ScanReport` with schema
//!   versioning
//! - **CSV**: the trade ledger and the advice rows for spreadsheets
//!
//! Reports with a schema version newer than this build are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use slopescan_core::domain::TradeRecord;

use crate::runner::{ScanReport, SCHEMA_VERSION};
use crate::screen::AdviceRow;

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScanReport to JSON")
}

/// Deserialize a `ScanReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ScanReport> {
    let report: ScanReport =
        serde_json::from_str(json).context("failed to deserialize ScanReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt_cell(v: Option<usize>) -> String {
    v.map(|d| d.to_string()).unwrap_or_default()
}

/// Export a trade ledger as CSV. Milestone cells are empty when never reached.
pub fn export_trades_csv<'a>(trades: impl IntoIterator<Item = &'a TradeRecord>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "entry_index",
        "entry_date",
        "entry_price",
        "entry_state",
        "exit_index",
        "exit_date",
        "exit_price",
        "exit_reason",
        "holding_days",
        "return_pct",
        "days_to_plus_10",
        "days_to_plus_20",
        "days_to_minus_10",
        "peak_return_pct",
        "trough_return_pct",
    ])?;

    for t in trades {
        wtr.write_record([
            t.symbol.as_str(),
            &t.entry_index.to_string(),
            &t.entry_date.to_string(),
            &format!("{:.4}", t.entry_price),
            t.entry_state.as_str(),
            &t.exit_index.to_string(),
            &t.exit_date.to_string(),
            &format!("{:.4}", t.exit_price),
            t.exit_reason.as_str(),
            &t.holding_days.to_string(),
            &format!("{:.4}", t.return_pct),
            &opt_cell(t.days_to_plus_10),
            &opt_cell(t.days_to_plus_20),
            &opt_cell(t.days_to_minus_10),
            &format!("{:.4}", t.peak_return_pct),
            &format!("{:.4}", t.trough_return_pct),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export advice rows as CSV, one row per symbol-day.
pub fn export_advice_csv(rows: &[AdviceRow]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "symbol",
        "date",
        "close",
        "pvo",
        "vri",
        "slope_pct",
        "slope_z",
        "score",
        "score_z",
        "state",
        "onset",
        "tier",
        "pvo_status",
        "vri_status",
    ])?;
    for r in rows {
        wtr.write_record([
            r.symbol.as_str(),
            &r.date.to_string(),
            &format!("{:.4}", r.close),
            &format!("{:.4}", r.volume_oscillator),
            &format!("{:.4}", r.volume_skew_ratio),
            &format!("{:.4}", r.slope_pct),
            &format!("{:.4}", r.slope_z),
            &format!("{:.4}", r.composite_score),
            &format!("{:.4}", r.score_z),
            r.state.as_str(),
            r.onset.as_str(),
            r.tier.as_str(),
            r.pvo_status.as_str(),
            r.vri_status.as_str(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the artifact set for a scan.
///
/// Creates `scan_{as_of}_{hash8}/` under `output_dir`, where `hash8` is the
/// first eight hex digits of the config hash, containing:
/// - `report.json`: the full `ScanReport`
/// - `trades.csv`: every trade, benchmark included
/// - `advice.csv`: every advice row
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &ScanReport, output_dir: &Path) -> Result<PathBuf> {
    let hash8: String = report.config_hash.chars().take(8).collect();
    let run_dir = output_dir.join(format!("scan_{}_{}", report.as_of.format("%Y%m%d"), hash8));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let json = export_json(report)?;
    write_file(&run_dir.join("report.json"), &json)?;

    let trades_csv = export_trades_csv(report.trades())?;
    write_file(&run_dir.join("trades.csv"), &trades_csv)?;

    let advice_csv = export_advice_csv(&report.screen().rows)?;
    write_file(&run_dir.join("advice.csv"), &advice_csv)?;

    Ok(run_dir)
}

/// Load a `ScanReport` from an artifact directory's report.json.
pub fn load_artifacts(dir: &Path) -> Result<ScanReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
