//! SlopeScan CLI: screen, backtest and classify commands.
//!
//! Commands:
//! - `screen`: scan the watch list and print recent advice rows
//! - `backtest`: scan, print per-symbol trade summaries and save artifacts
//! - `classify`: label every day of a single local CSV series

mod obs;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use slopescan_core::data::{
    read_csv_bars, CircuitBreaker, CsvProvider, DataProvider, DataSource, SyntheticProvider,
    YahooProvider,
};
use slopescan_core::domain::TradeRecord;
use slopescan_runner::export::{export_json, save_artifacts};
use slopescan_runner::{
    analyze_series, run, AdviceRow, BacktestSummary, LoadedSeries, ScanConfig, ScanReport,
    ScreenTier,
};

#[derive(Parser)]
#[command(
    name = "slopescan",
    about = "SlopeScan CLI: slope and volume screening with a long-only backtest"
)]
struct Cli {
    /// Log filter (overridden by SLOPESCAN_LOG).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log output format: text or json.
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ScanArgs {
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Calendar days of history up to and including --as-of.
    #[arg(long)]
    lookback_days: Option<u32>,

    /// Path to a TOML scan config. Defaults to built-in settings.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read `{SYMBOL}.csv` files from this directory instead of Yahoo Finance.
    #[arg(long, conflicts_with = "synthetic")]
    csv_dir: Option<PathBuf>,

    /// Use deterministic synthetic data only (no network).
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Generate synthetic data for symbols whose fetch fails.
    #[arg(long, default_value_t = false)]
    fallback_synthetic: bool,

    /// Extra symbols appended to the configured watch list.
    symbols: Vec<String>,

    /// Print the full report as JSON instead of tables.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the watch list and print recent advice rows per symbol.
    Screen {
        #[command(flatten)]
        scan: ScanArgs,

        /// Symbols listed per tier in the tier summary.
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Scan the watch list, print trade summaries and save artifacts.
    Backtest {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output directory for report.json, trades.csv and advice.csv.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Classify a single local series (date,close,volume CSV).
    Classify {
        /// CSV file with date, close and volume columns.
        #[arg(long)]
        csv: PathBuf,

        /// Symbol name used in the output. Defaults to the file stem.
        #[arg(long)]
        symbol: Option<String>,

        /// Path to a TOML scan config. Defaults to built-in settings.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Most recent days printed.
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Print the analysis as JSON instead of tables.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    obs::init_tracing(&cli.log_level, &cli.log_format)?;

    match cli.command {
        Commands::Screen { scan, limit } => run_screen(scan, limit),
        Commands::Backtest { scan, output_dir } => run_backtest_cmd(scan, output_dir),
        Commands::Classify {
            csv,
            symbol,
            config,
            limit,
            json,
        } => run_classify(csv, symbol, config, limit, json),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ScanConfig::default()),
    }
}

fn build_provider(scan: &ScanArgs) -> Result<Box<dyn DataProvider>> {
    if let Some(dir) = &scan.csv_dir {
        if !dir.is_dir() {
            bail!("--csv-dir {} is not a directory", dir.display());
        }
        return Ok(Box::new(CsvProvider::new(dir.clone())));
    }
    if scan.synthetic {
        return Ok(Box::new(SyntheticProvider));
    }
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider =
        YahooProvider::new(circuit_breaker).context("failed to build Yahoo Finance client")?;
    Ok(Box::new(provider))
}

fn scan(args: &ScanArgs) -> Result<ScanReport> {
    let mut config = load_config(args.config.as_ref())?;
    config.watch_list.extend(args.symbols.iter().cloned());
    if config.symbols().is_empty() {
        bail!("nothing to scan: the watch list is empty and no benchmark is set");
    }

    let as_of = args
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let lookback_days = args.lookback_days.unwrap_or(config.lookback_days);
    if lookback_days == 0 {
        bail!("--lookback-days must be at least 1");
    }

    let provider = build_provider(args)?;
    tracing::info!(
        provider = provider.name(),
        as_of = %as_of,
        lookback_days,
        symbols = config.symbols().len(),
        "starting scan"
    );
    let report = run(
        provider.as_ref(),
        &config,
        as_of,
        lookback_days,
        args.fallback_synthetic,
    )?;

    for skipped in &report.skipped {
        eprintln!("skipped {}: {}", skipped.symbol, skipped.reason);
    }
    if report.has_synthetic {
        eprintln!("warning: report includes synthetic data");
    }
    Ok(report)
}

fn run_screen(args: ScanArgs, limit: usize) -> Result<()> {
    let report = scan(&args)?;
    if args.json {
        println!("{}", export_json(&report)?);
        return Ok(());
    }

    let screen = report.screen();
    println!("SlopeScan as of {} ({} symbols)", report.as_of, report.analyses.len());
    println!();
    print_advice_header();
    let mut last_symbol: Option<&str> = None;
    for row in &screen.rows {
        if last_symbol.is_some_and(|s| s != row.symbol) {
            println!();
        }
        print_advice_row(row);
        last_symbol = Some(row.symbol.as_str());
    }

    for (title, tier) in [
        ("Strong", ScreenTier::Strong),
        ("Bearish", ScreenTier::Bearish),
        ("Wait", ScreenTier::Wait),
    ] {
        let rows = screen.by_tier(tier, limit);
        println!();
        println!("{title} ({})", rows.len());
        for row in rows {
            println!(
                "  {:<10} z={:>6.2} {:<14} {}",
                row.symbol,
                row.slope_z,
                row.state.to_string(),
                row.onset
            );
        }
    }
    Ok(())
}

fn run_backtest_cmd(args: ScanArgs, output_dir: PathBuf) -> Result<()> {
    let report = scan(&args)?;
    if args.json {
        println!("{}", export_json(&report)?);
    } else {
        print_summary_header();
        for analysis in &report.analyses {
            let label = if analysis.is_benchmark {
                format!("{}*", analysis.symbol)
            } else {
                analysis.symbol.clone()
            };
            print_summary_row(&label, &analysis.summary);
        }
        println!("{}", "-".repeat(92));
        print_summary_row("ALL", &report.aggregate);
        println!("(* benchmark, excluded from ALL)");
    }

    let run_dir = save_artifacts(&report, &output_dir)?;
    eprintln!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn run_classify(
    csv: PathBuf,
    symbol: Option<String>,
    config: Option<PathBuf>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let config = load_config(config.as_ref())?;
    let symbol = symbol.unwrap_or_else(|| {
        csv.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "CSV".to_string())
    });
    let bars = read_csv_bars(&csv).with_context(|| format!("failed to read {}", csv.display()))?;
    let loaded = LoadedSeries::from_bars(symbol, bars, DataSource::CsvImport);
    let analysis = analyze_series(&loaded, false, &config)
        .with_context(|| format!("failed to analyze {}", csv.display()))?;

    if json {
        let out = serde_json::to_string_pretty(&analysis).context("failed to serialize analysis")?;
        println!("{out}");
        return Ok(());
    }

    println!(
        "{}",
        series_heading(
            &analysis.symbol,
            analysis.bar_count,
            analysis.dropped_bars,
            analysis.days.len()
        )
    );
    println!();
    println!(
        "{:<10} {:>10} {:>8} {:>8} {:<15} {:<20} {:<5}",
        "Date", "Close", "SlopeZ", "ScoreZ", "State", "Rule", "Dir"
    );
    println!("{}", "-".repeat(82));
    let start = analysis.days.len().saturating_sub(limit);
    for day in &analysis.days[start..] {
        println!(
            "{:<10} {:>10.2} {:>8.2} {:>8.2} {:<15} {:<20} {:<5}",
            day.date.to_string(),
            day.close,
            day.slope_z,
            day.score_z,
            day.state.to_string(),
            day.rule.describe(),
            day.direction.to_string()
        );
    }

    println!();
    println!("Trades: {}", analysis.trades.len());
    for t in &analysis.trades {
        println!("{}", trade_line(t));
    }
    Ok(())
}

// ─── Table formatting ───────────────────────────────────────────────

fn series_heading(symbol: &str, bars: usize, dropped: usize, days: usize) -> String {
    format!("{symbol}: {bars} bars, {dropped} dropped, {days} labelled days")
}

fn trade_line(t: &TradeRecord) -> String {
    format!(
        "  {} -> {}  {:>4}d  {:>+8.2}%  {}",
        t.entry_date,
        t.exit_date,
        t.holding_days,
        t.return_pct,
        t.exit_reason.as_str()
    )
}

fn print_advice_header() {
    println!(
        "{:<10} {:<10} {:>10} {:>8} {:>6} {:>8} {:>7} {:>7} {:<15} {:<12} {:<9} {:<9} {:<13}",
        "Symbol", "Date", "Close", "PVO", "VRI", "Slope%", "SlopeZ", "ScoreZ", "State", "Onset",
        "Tier", "PVO", "VRI"
    );
    println!("{}", "-".repeat(136));
}

fn print_advice_row(row: &AdviceRow) {
    println!(
        "{:<10} {:<10} {:>10.2} {:>8.2} {:>6.1} {:>8.3} {:>7.2} {:>7.2} {:<15} {:<12} {:<9} {:<9} {:<13}",
        row.symbol,
        row.date.to_string(),
        row.close,
        row.volume_oscillator,
        row.volume_skew_ratio,
        row.slope_pct,
        row.slope_z,
        row.score_z,
        row.state.to_string(),
        row.onset,
        row.tier.as_str(),
        row.pvo_status.as_str(),
        row.vri_status.as_str()
    );
}

fn print_summary_header() {
    println!(
        "{:<10} {:>6} {:>7} {:>8} {:>8} {:>8} {:>9} {:>8} {:>5} {:>5} {:>5} {:>6}",
        "Symbol", "Trades", "Win%", "Mean%", "Best%", "Worst%", "Total%", "MaxDD%", "+10", "+20",
        "-10", "AvgD"
    );
    println!("{}", "-".repeat(92));
}

fn print_summary_row(label: &str, s: &BacktestSummary) {
    println!(
        "{:<10} {:>6} {:>7.1} {:>8.2} {:>8.2} {:>8.2} {:>9.2} {:>8.2} {:>5} {:>5} {:>5} {:>6.1}",
        label,
        s.trade_count,
        s.win_rate * 100.0,
        s.mean_return_pct,
        s.max_return_pct,
        s.min_return_pct,
        s.total_return_pct,
        s.max_drawdown * 100.0,
        s.hits_plus_10,
        s.hits_plus_20,
        s.hits_minus_10,
        s.avg_holding_days
    );
}
