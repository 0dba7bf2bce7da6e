//! Procurement Dashboard main entry point
//!
//! This is the command-line interface for the procurement dashboard.

use anyhow::Context;
use clap::Parser;
use procurement_dashboard::config::{load_config_with_hash, Config, Overrides};
use procurement_dashboard::fetch::{fetch_records, SearchQuery};
use procurement_dashboard::output::{print_overview, write_dashboard, ReportContext};
use procurement_dashboard::records::{clean_records, LocalFilters};
use procurement_dashboard::analyze;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Procurement Dashboard: public-procurement reporting from open data
///
/// Fetches contracts matching a keyword from the public procurement search
/// API, cleans and aggregates them, and writes a markdown dashboard with
/// SVG charts and CSV exports.
#[derive(Parser, Debug)]
#[command(name = "procurement-dashboard")]
#[command(version)]
#[command(about = "Public procurement dashboard from open data", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Restrict the search to one year
    #[arg(long, conflicts_with = "all_years")]
    year: Option<i32>,

    /// Search every year, ignoring the configured year
    #[arg(long)]
    all_years: bool,

    /// Search keyword (at least three characters)
    #[arg(long)]
    keyword: Option<String>,

    /// Only keep contracts whose buyer contains this text
    #[arg(long)]
    buyer: Option<String>,

    /// Only keep contracts whose type contains this text
    #[arg(long)]
    contract_type: Option<String>,

    /// Maximum number of pages to fetch
    #[arg(long)]
    max_pages: Option<u32>,

    /// Directory receiving the report, charts and exports
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Skip chart rendering
    #[arg(long)]
    no_charts: bool,

    /// Validate config and show the first request without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            year: self.year,
            all_years: self.all_years,
            keyword: self.keyword.clone(),
            buyer: self.buyer.clone(),
            contract_type: self.contract_type.clone(),
            max_pages: self.max_pages,
            output_dir: self.output_dir.clone(),
            no_charts: self.no_charts,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config, cli.overrides())
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else {
        handle_run(&config, &config_hash).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("procurement_dashboard=info,warn"),
            1 => EnvFilter::new("procurement_dashboard=debug,info"),
            2 => EnvFilter::new("procurement_dashboard=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the first request
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Procurement Dashboard Dry Run ===\n");

    println!("API:");
    println!("  Base URL: {}", config.api.base_url);
    println!("  Max pages: {}", config.api.max_pages);
    println!("  Delay between pages: {}ms", config.api.page_delay_ms);
    println!(
        "  Attempts per page: {} (retry delay {}ms)",
        config.api.max_attempts, config.api.retry_delay_ms
    );
    println!("  Timeout: {}s", config.api.timeout_secs);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nQuery:");
    println!("  Keyword: {}", config.query.keyword.trim());
    println!("  Year: {}", config.query.year_label());
    println!(
        "  Buyer filter: {}",
        config.query.buyer_filter().unwrap_or("-")
    );
    println!(
        "  Contract type filter: {}",
        config.query.contract_type_filter().unwrap_or("-")
    );

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!(
        "  Charts: {}",
        if config.output.charts { "yes" } else { "no" }
    );

    let url = SearchQuery::from(&config.query)
        .request_url(&config.api.base_url, 1)
        .context("Failed to build request URL")?;

    println!("\n✓ Configuration is valid");
    println!("✓ First request would be: {}", url);

    Ok(())
}

/// Handles the main run: fetch, clean, analyze, write
async fn handle_run(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Searching '{}' (year: {})",
        config.query.keyword.trim(),
        config.query.year_label()
    );

    let fetched = fetch_records(config)
        .await
        .context("Failed to fetch procurement records")?;

    let filters = LocalFilters::new(
        config.query.buyer_filter(),
        config.query.contract_type_filter(),
    );
    let (contracts, cleaning) = clean_records(&fetched.records, &filters);
    let dashboard = analyze(&contracts);

    let context = ReportContext::new(config, &fetched, config_hash);
    let directory = Path::new(&config.output.directory);
    let written = write_dashboard(
        directory,
        &contracts,
        &cleaning,
        &dashboard,
        &context,
        config.output.charts,
    )
    .with_context(|| format!("Failed to write dashboard to {}", directory.display()))?;

    print_overview(&dashboard, &cleaning);
    println!("\n✓ Dashboard written to: {}", written.report.display());

    Ok(())
}
