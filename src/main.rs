//! rd_insights - R&D Expenditure CSV Analysis
//!
//! Loads an R&D expenditure CSV, cleans it, prints diagnostics and
//! renders static charts of the aggregated views.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Load or configuration error, or a chart failed

mod charts;
mod cli;
mod config;
mod data;
mod report;
mod stats;

use anyhow::{bail, Context, Result};
use charts::{ChartInputs, ChartKind, ChartRenderer, ChartTheme};
use cli::Args;
use config::Config;
use data::{CsvExporter, DataLoader, DataProcessor};
use report::Reporter;
use std::io::{self, Write};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    let args = Args::parse_args();

    if let Err(e) = init_logging(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    info!("rd_insights v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Analysis failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Logs go to stderr so stdout carries only the report. `RUST_LOG` wins over flags.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Load, clean, report, render, then optionally export.
fn run(args: Args) -> Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    config.merge_with_args(&args);
    debug!("Configuration: {:?}", config);

    // Styling shared by every chart
    let renderer = ChartRenderer::new(ChartTheme::whitegrid(config.charts.dpi));

    let raw = DataLoader::load_csv(&config.input.path)
        .with_context(|| format!("Cannot load {}", config.input.path.display()))?;
    let (coerced, cleaned) = DataProcessor::clean(raw);

    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        Reporter::write_report(&coerced, &mut out).context("Failed to write report")?;
        out.flush()?;
    }

    info!(
        "{} of {} rows kept for analysis; ranking top {} categories",
        cleaned.height(),
        coerced.height(),
        config.charts.top_n
    );

    let inputs = ChartInputs {
        raw: &coerced,
        cleaned: &cleaned,
        top_n: config.charts.top_n,
        histogram_bins: config.charts.histogram_bins,
    };
    let failed = render_charts(&renderer, &inputs, &config)?;

    if config.output.export_cleaned {
        CsvExporter::export_csv(cleaned.frame(), &config.output.cleaned_path)
            .context("Failed to export cleaned data")?;
    }

    if !failed.is_empty() {
        bail!("{} of {} charts failed: {}", failed.len(), ChartKind::ALL.len(), failed.join(", "));
    }

    println!("\n✅ Charts written to {}", config.output.dir.display());
    Ok(())
}

/// Render and save every chart. A failing chart is logged and skipped.
///
/// Returns the file names of the charts that failed.
fn render_charts(
    renderer: &ChartRenderer,
    inputs: &ChartInputs<'_>,
    config: &Config,
) -> Result<Vec<&'static str>> {
    let dir = &config.output.dir;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut failed = Vec::new();
    for kind in ChartKind::ALL {
        let saved = renderer
            .render(kind, inputs)
            .and_then(|image| ChartRenderer::save(&image, dir, kind));

        match saved {
            Ok(path) => {
                if config.output.show {
                    if let Err(e) = open::that(&path) {
                        warn!("Could not open {}: {}", path.display(), e);
                    }
                }
            }
            Err(e) => {
                error!("Chart {} failed: {}", kind.file_name(), e);
                failed.push(kind.file_name());
            }
        }
    }
    Ok(failed)
}
