//! CLI argument definitions for sigmascan.
//!
//! The binary plays the presentation-layer role around the core pipeline:
//! every command triggers one full recomputation (or a raw fetch) and prints
//! a response envelope.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `analyze` | Full pipeline: series, anomalies, correlation, risk |
//! | `history` | Normalized adjusted-close and volume tables only |
//! | `heatmap` | One filled correlation-heatmap pane |
//! | `sources` | Show the active data source and its health |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--source` | `yahoo` | Market data source |
//! | `--timeout-ms` | `10000` | Per-request timeout budget in ms |
//!
//! # Examples
//!
//! ```bash
//! # One year of anomalies for the default-style selection
//! sigmascan analyze GOOGL MSFT NVDA TSLA TSM --sensitivity 2.0 --pretty
//!
//! # A tighter window with a lower threshold
//! sigmascan analyze NVDA --start 2024-01-01 --end 2024-06-30 --sensitivity 1.25
//!
//! # Cross-kind heatmap pane, offline deterministic data
//! sigmascan heatmap NVDA TSM --pane adjclose-volume --source offline
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Stock anomaly tracking and relative risk CLI.
///
/// Flags dates whose whole-sample z-score exceeds a sensitivity threshold,
/// correlates anomaly co-occurrence across tickers, and rates each ticker's
/// risk relative to the current selection.
#[derive(Debug, Parser)]
#[command(
    name = "sigmascan",
    author,
    version,
    about = "Stock anomaly tracking and relative risk CLI"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Market data source.
    #[arg(long, global = true, value_enum, default_value_t = SourceSelector::Yahoo)]
    pub source: SourceSelector,

    /// Per-request timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Ndjson,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceSelector {
    /// Yahoo Finance daily chart data.
    Yahoo,
    /// Deterministic synthetic data, no network.
    Offline,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full anomaly pipeline over a ticker selection.
    Analyze(AnalyzeArgs),
    /// Fetch and normalize the raw series without running detection.
    History(WindowArgs),
    /// Run the pipeline and emit one correlation-heatmap pane.
    Heatmap(HeatmapArgs),
    /// Show the active data source and its health.
    Sources,
}

#[derive(Debug, Args)]
pub struct WindowArgs {
    /// Ticker symbols; duplicates are ignored, order is kept.
    #[arg(required = true)]
    pub symbols: Vec<String>,

    /// Window start date (YYYY-MM-DD). Defaults to one year before the end.
    #[arg(long)]
    pub start: Option<String>,

    /// Window end date (YYYY-MM-DD). Defaults to today (UTC).
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Anomaly threshold in z-score magnitudes (1.0 to 2.5).
    #[arg(long, default_value_t = 2.0)]
    pub sensitivity: f64,
}

#[derive(Debug, Args)]
pub struct HeatmapArgs {
    #[command(flatten)]
    pub analyze: AnalyzeArgs,

    /// Which quantity kinds to cross-reference:
    /// volume-volume, adjclose-adjclose, or adjclose-volume.
    #[arg(long, default_value = "volume-volume")]
    pub pane: String,
}
