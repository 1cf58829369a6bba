//! Course Forecast CLI
//!
//! Predicts next-term enrollment and section counts from a historical
//! enrollment CSV.
//!
//! # Usage
//!
//! ```bash
//! forecast-courses history.csv
//! forecast-courses history.csv --capacity 25 --format json
//! forecast-courses history.csv --config forecast.toml --collect-failures \
//!   --format csv --output forecast.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use course_forecast::algorithms::{CourseFailure, FailurePolicy};
use course_forecast::config::ForecastConfig;
use course_forecast::core::domain::{ForecastResult, SectionCapacity};
use course_forecast::core::error::ForecastError;
use course_forecast::io::export;
use course_forecast::services::ForecastSession;

#[derive(Parser)]
#[command(
    name = "forecast-courses",
    about = "Forecast next-term course enrollment and sections",
    version
)]
struct Cli {
    /// Historical enrollment CSV (semester, course code, total students)
    csv: PathBuf,

    #[arg(long, help = "Maximum students per section (overrides the config file)")]
    capacity: Option<u32>,

    #[arg(long, help = "TOML configuration file (defaults to forecast.toml if present)")]
    config: Option<PathBuf>,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Order each course's observations by term before training"
    )]
    sort_by_term: bool,

    #[arg(
        long,
        action = ArgAction::SetTrue,
        help = "Report failing courses instead of aborting the whole run"
    )]
    collect_failures: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[arg(long, short, help = "Write output to this file instead of stdout")]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    info!("Forecasting from {}", cli.csv.display());

    let session = ForecastSession::new(config);
    let run = match session.run_file(cli.csv.clone()).await {
        Ok(run) => run,
        Err(e) => {
            if let Some(hint) = failure_hint(&e) {
                error!("{}", hint);
            }
            return Err(e).with_context(|| format!("Forecast failed for {}", cli.csv.display()));
        }
    };

    report_failures(&run.report.failures);
    let rendered = render(run.results(), cli.format)?;

    match &cli.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {} forecast(s) to {}", run.results().len(), path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Config file first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<ForecastConfig> {
    let mut config = match &cli.config {
        Some(path) => ForecastConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ForecastConfig::from_default_location()
            .context("Failed to load forecast.toml")?
            .unwrap_or_default(),
    };

    if let Some(capacity) = cli.capacity {
        config.forecast.section_capacity =
            SectionCapacity::new(capacity).context("Invalid --capacity")?;
    }
    if cli.sort_by_term {
        config.forecast.sort_by_term = true;
    }
    if cli.collect_failures {
        config.forecast.failure_policy = FailurePolicy::Collect;
    }

    Ok(config)
}

/// Suggest how to get past a run that one course brought down.
fn failure_hint(error: &ForecastError) -> Option<String> {
    error.course_id().map(|course| {
        format!(
            "Course '{}' stopped the run; use --collect-failures to forecast the other courses",
            course
        )
    })
}

fn report_failures(failures: &[CourseFailure]) {
    for failure in failures {
        warn!("No forecast for {}: {}", failure.course_id, failure.error);
    }
}

fn render(results: &[ForecastResult], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(results)),
        OutputFormat::Json => {
            let mut json = export::to_json(results)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            export::write_csv_to(results, &mut buffer)?;
            String::from_utf8(buffer).context("CSV output was not UTF-8")
        }
    }
}

fn render_table(results: &[ForecastResult]) -> String {
    const HEADERS: [&str; 3] = ["Course Code", "Predicted Enrollment", "Predicted Sections"];

    let course_width = results
        .iter()
        .map(|r| r.course_id().chars().count())
        .chain([HEADERS[0].len()])
        .max()
        .unwrap_or(0);

    let mut table = format!(
        "{:<cw$}  {:>ew$}  {:>sw$}\n",
        HEADERS[0],
        HEADERS[1],
        HEADERS[2],
        cw = course_width,
        ew = HEADERS[1].len(),
        sw = HEADERS[2].len()
    );
    for result in results {
        table.push_str(&format!(
            "{:<cw$}  {:>ew$}  {:>sw$}\n",
            result.course_id(),
            result.predicted_enrollment(),
            result.predicted_sections(),
            cw = course_width,
            ew = HEADERS[1].len(),
            sw = HEADERS[2].len()
        ));
    }
    table
}
