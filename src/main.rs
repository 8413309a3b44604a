use anyhow::{Context, Result};
use clap::Parser;
use sheetchart::config::Config;
use sheetchart::dashboard::Dashboard;
use sheetchart::data::Dataset;
use sheetchart::diagnostic::DiagnosticReport;
use sheetchart::palette::ThemeMode;
use sheetchart::render::render_svg;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Exit status when no chart of the request could be prepared
const EXIT_ALL_DIAGNOSTICS: i32 = 2;

#[derive(Parser, Debug)]
#[command(name = "sheetchart")]
#[command(about = "Render spreadsheet rows as charts from a JSON chart descriptor", long_about = None)]
struct Args {
    /// Rows as a JSON array of objects (.json) or a CSV file with headers
    #[arg(long)]
    data: PathBuf,

    /// Chart descriptor: one object, an array, or {"charts": {...}}
    #[arg(long)]
    descriptor: PathBuf,

    /// JSON file with "render" and "engine" sections
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show every category instead of the top N
    #[arg(long)]
    show_all: bool,

    /// Use the dark palette
    #[arg(long)]
    dark: bool,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Print the prepared chart data as JSON instead of drawing it
    #[arg(long)]
    plan: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_path(path)?,
        None => Config::default(),
    };
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if args.dark {
        config.render.theme = ThemeMode::Dark;
    }

    let dataset = Dataset::from_path(&args.data).context("Failed to load data")?;
    let dashboard = Dashboard::from_path(&args.descriptor).context("Failed to load chart descriptor")?;
    debug!(rows = dataset.rows.len(), charts = dashboard.charts.len(), "loaded inputs");
    if dashboard.charts.is_empty() {
        warn!(descriptor = %args.descriptor.display(), "descriptor requests no charts");
    }

    let outcomes = dashboard.evaluate(&dataset.rows, args.show_all, &config.engine);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for outcome in &outcomes {
        let output = match &outcome.result {
            Ok(plan) if args.plan => {
                serde_json::to_string_pretty(plan).context("Failed to serialize chart plan")?
            }
            Ok(plan) => render_svg(plan, &config.render)
                .with_context(|| format!("Failed to render chart '{}'", outcome.title))?,
            Err(diagnostic) => {
                let report = DiagnosticReport::new(outcome.title.as_str(), diagnostic.clone());
                serde_json::to_string(&report).context("Failed to serialize diagnostic")?
            }
        };
        writeln!(handle, "{}", output).context("Failed to write to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;

    // also covers a request with no charts at all
    if outcomes.iter().all(|o| o.result.is_err()) {
        std::process::exit(EXIT_ALL_DIAGNOSTICS);
    }

    Ok(())
}
