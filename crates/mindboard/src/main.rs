//! mindboard - Cross-filtering dashboard for the student mental health survey

mod cli;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mindboard_core::{DashboardConfig, SurveyParser, SurveySummary};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "mindboard=info,mindboard_core=info,mindboard_tui=info";

#[derive(Parser)]
#[command(
    name = "mindboard",
    version,
    about = "Cross-filtering dashboard for the student mental health survey",
    long_about = "Loads the student mental health survey CSV and shows linked charts:\n\
                  a financial-stress dot matrix, a course x age heat map, well-being\n\
                  mini bars or circles, a counseling bar chart and a mental health tree map.\n\
                  Clicking one chart filters or highlights all the others.\n\
                  \n\
                  Examples:\n\
                    mindboard survey.csv             # Run TUI (default)\n\
                    mindboard tui survey.csv         # Same, explicit\n\
                    mindboard summary survey.csv     # Print aggregate tables\n\
                    mindboard summary survey.csv --json\n\
                  \n\
                  Environment Variables:\n\
                    MINDBOARD_CONFIG                 # Config file (default: <config dir>/mindboard/config.toml)\n\
                    MINDBOARD_NO_COLOR               # Disable ANSI colors\n\
                    RUST_LOG                         # Log filter (default: mindboard=info)"
)]
struct Cli {
    #[command(subcommand)]
    mode: Option<Mode>,

    /// Survey CSV for the default TUI mode
    csv: Option<PathBuf>,

    /// Path to the config file
    #[arg(long, env = "MINDBOARD_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Disable ANSI colors (log-friendly)
    #[arg(long, env = "MINDBOARD_NO_COLOR", global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Run TUI interface (default)
    Tui {
        /// Survey CSV
        csv: PathBuf,
    },
    /// Print aggregate tables and exit
    Summary {
        /// Survey CSV
        csv: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mode = match cli.mode {
        Some(mode) => mode,
        None => Mode::Tui {
            csv: cli.csv.context("No survey CSV given (try 'mindboard --help')")?,
        },
    };

    // The TUI owns the terminal, so its logs go to a file
    init_tracing(matches!(mode, Mode::Tui { .. }), cli.no_color)?;

    let config = DashboardConfig::discover(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match mode {
        Mode::Tui { csv } => run_tui(config, csv).await,
        Mode::Summary { csv, json } => run_summary(config, &csv, json, cli.no_color).await,
    }
}

fn init_tracing(to_file: bool, no_color: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    if to_file {
        let dir = dirs::cache_dir()
            .context("Could not determine cache directory")?
            .join("mindboard");
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join("mindboard.log");
        let file = std::fs::File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(!no_color)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

async fn run_tui(config: DashboardConfig, csv: PathBuf) -> Result<()> {
    if !csv.exists() {
        anyhow::bail!("Survey file not found: {}", csv.display());
    }
    tracing::info!(path = %csv.display(), "Starting TUI");

    // TUI shows a loading screen and loads the survey in the background
    mindboard_tui::run(config, csv).await
}

async fn run_summary(config: DashboardConfig, csv: &Path, json: bool, no_color: bool) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let start = Instant::now();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));

    spinner.set_message(format!("Loading {}...", csv.display()));
    let (rows, report) = SurveyParser::from_config(&config).load_graceful(csv).await;

    if report.has_fatal_errors() {
        spinner.finish_and_clear();
        eprintln!("Fatal errors during data load:");
        for error in report.errors.iter() {
            eprintln!("  - {}: {}", error.source, error.message);
            if let Some(suggestion) = &error.suggestion {
                eprintln!("    {}", suggestion);
            }
        }
        anyhow::bail!("Could not load {}", csv.display());
    }

    spinner.set_message("Computing aggregates...");
    let summary = SurveySummary::compute(&rows, &config);

    let elapsed = start.elapsed();
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    eprintln!(
        "✓ Loaded {} students in {:.2}s",
        summary.rows,
        elapsed.as_secs_f64()
    );
    println!("mindboard - Survey Summary");
    println!("==========================");
    println!();
    print!("{}", cli::format_load_report(&report));
    println!();
    println!("{}", cli::format_summary(&summary, no_color));

    Ok(())
}
