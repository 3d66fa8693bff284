//! Command-line interface argument parsing.

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

/// rd_insights - R&D expenditure CSV analysis
///
/// Loads an R&D expenditure CSV, prints dataset diagnostics, and renders
/// five PNG charts (yearly totals, top sectors, yearly distribution,
/// sampling error, missing data).
///
/// Examples:
///   rd_insights
///   rd_insights research.csv --output-dir charts
///   rd_insights research.csv --export-cleaned --show
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// CSV file to analyse
    ///
    /// Overrides `input.path` from the configuration file
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for rd_insights.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory the chart images are written to
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Open each chart in the system image viewer once saved
    #[arg(long)]
    pub show: bool,

    /// Also write the cleaned table as CSV
    #[arg(long)]
    pub export_cleaned: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }
}
