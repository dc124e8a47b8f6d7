use anyhow::Context;
use clap::Parser;
use movie_insights::app::ports::ReportOutputPort;
use movie_insights::app::{InsightsUseCase, RunSummary};
use movie_insights::config::{self, Config};
use movie_insights::constants::{DEFAULT_OUTPUT_DIR, DEFAULT_YEAR};
use movie_insights::infra::{ExcelReportAdapter, JsonReportAdapter, TmdbCatalogAdapter};
use movie_insights::observability::{self, metrics};
use movie_insights::types::OutputFormat;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "movie_insights")]
#[command(about = "TMDB Movie Insights Pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    /// Year of movie releases to fetch
    #[arg(long, default_value_t = DEFAULT_YEAR)]
    year: i32,

    /// Format to save final output
    #[arg(long, value_enum, default_value_t = OutputFormat::Excel)]
    output_format: OutputFormat,

    /// Directory the report is written to
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// TOML configuration file (defaults to ./movie_insights.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write a Prometheus text snapshot of run metrics to this file
    #[arg(long)]
    metrics_file: Option<PathBuf>,
}

fn print_summary(summary: &RunSummary) {
    println!("\n📊 Movie insights for {}:", summary.year);
    println!("   Raw movies fetched: {}", summary.raw_records);
    println!("   Genres available: {}", summary.genres);
    println!("   Missing popularity: {}", summary.validation.missing_popularity);
    println!("   Negative popularity: {}", summary.validation.negative_popularity);
    println!("   Duplicates removed: {}", summary.validation.duplicates_removed);
    println!(
        "   Outside {} or undated: {}",
        summary.year,
        summary.validation.outside_year + summary.validation.invalid_release_dates
    );
    println!("   Unknown vote counts: {}", summary.validation.unknown_vote_counts);
    if let Some(high) = summary.flags.high_pop_threshold {
        println!("   High popularity threshold (99th percentile): {:.2}", high);
    }
    if let Some(low) = summary.flags.low_vote_threshold {
        println!("   Low vote threshold (25th percentile in top 1%): {:.0}", low);
    }
    println!("   Flagged as unreliable: {}", summary.flags.flagged);
    println!("   Rows written: {}", summary.rows_written);
    println!("   Output file: {}", summary.output_file.display());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = observability::init_logging("logs");

    // Credential and configuration are checked before any work starts
    let api_key = config::api_key_from_env()?;
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let metrics_handle = match &cli.metrics_file {
        Some(_) => Some(metrics::init()?),
        None => None,
    };

    let catalog = TmdbCatalogAdapter::new(api_key, config.tmdb.clone())?;
    let output: Box<dyn ReportOutputPort> = match cli.output_format {
        OutputFormat::Json => Box::new(JsonReportAdapter::new()),
        OutputFormat::Excel => Box::new(ExcelReportAdapter::new()),
    };
    let use_case = InsightsUseCase::new(Box::new(catalog), output, cli.output_dir.clone());

    let summary = match use_case.run(cli.year).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(e).with_context(|| format!("Movie insights run for {} failed", cli.year));
        }
    };

    print_summary(&summary);
    info!(
        rows = summary.rows_written,
        flagged = summary.flags.flagged,
        "✅ Pipeline completed successfully."
    );

    if let (Some(handle), Some(path)) = (metrics_handle.as_ref(), cli.metrics_file.as_deref()) {
        metrics::write_snapshot(handle, path)?;
    }

    Ok(())
}
