//! Catalog Harvester main entry point
//!
//! This is the command-line interface for the catalog harvester.

use anyhow::Context;
use catalog_harvester::config::{load_config_with_hash, Config, SessionMode};
use catalog_harvester::crawler::harvest;
use catalog_harvester::output::{print_statistics, HarvestStatistics};
use catalog_harvester::session::bootstrapper_for;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Catalog Harvester: a layout-tolerant product catalog crawler
///
/// Bootstraps a browser-cleared session, discovers the catalog categories
/// of the configured storefront, crawls every category concurrently, and
/// exports normalized product records.
///
/// Exits with 0 when every category was crawled, 2 when some categories
/// failed, and 1 on a fatal error or when no category could be crawled.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvester")]
#[command(version)]
#[command(about = "A layout-tolerant product catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Skip the browser and use the configured headers and cookies directly
    #[arg(long)]
    direct: bool,

    /// Write the JSON export to this path instead of the configured one
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Also write a CSV table to this path
    #[arg(long, value_name = "PATH")]
    csv: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.direct {
        config.session.mode = SessionMode::Direct;
    }
    if let Some(path) = &cli.json {
        config.output.json_path = Some(path.to_string_lossy().into_owned());
    }
    if let Some(path) = &cli.csv {
        config.output.csv_path = Some(path.to_string_lossy().into_owned());
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(ExitCode::SUCCESS);
    }

    handle_harvest(config, &config_hash, cli.quiet).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvester=info,warn"),
            1 => EnvFilter::new("catalog_harvester=debug,info"),
            2 => EnvFilter::new("catalog_harvester=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Catalog Harvester Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Sitemap: {}", config.site.sitemap_path);

    println!("\nCrawler Configuration:");
    println!("  Max workers: {}", config.crawler.max_workers);
    println!("  Max pages per category: {}", config.crawler.max_pages);
    println!("  Stagnation limit: {}", config.crawler.stagnation_limit);
    println!("  Page delay: {}ms", config.crawler.page_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nSession:");
    println!("  Mode: {:?}", config.session.mode);
    println!("  Settle time: {}s", config.session.settle_secs);
    println!("  Configured cookies: {}", config.session.cookies.len());

    println!("\nOutput:");
    match &config.output.json_path {
        Some(path) => println!("  JSON: {}", path),
        None => println!("  JSON: disabled"),
    }
    match &config.output.csv_path {
        Some(path) => println!("  CSV: {}", path),
        None => println!("  CSV: disabled"),
    }
    match &config.output.database_path {
        Some(path) => println!("  Database: {}", path),
        None => println!("  Database: disabled"),
    }

    if config.categories.is_empty() {
        println!("\nCategories: discovered from {}", config.site.sitemap_path);
        println!("  Denied keywords: {}", config.discovery.deny_keywords.join(", "));
    } else {
        println!("\nCategories ({}):", config.categories.len());
        for entry in &config.categories {
            println!("  - {}: {}", entry.label, entry.url);
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, config_hash: &str, quiet: bool) -> anyhow::Result<ExitCode> {
    let bootstrapper = bootstrapper_for(&config)?;
    let stock_placeholder = config.extraction.stock_placeholder.clone();

    tracing::info!(
        "Starting harvest of {} ({:?} session)",
        config.site.base_url,
        config.session.mode
    );

    let report = harvest(config, config_hash, bootstrapper)
        .await
        .context("Harvest failed")?;

    if !quiet {
        print_statistics(&HarvestStatistics::from_report(&report, &stock_placeholder));
    }

    let status = report.status();
    tracing::info!("Harvest {}", status);
    Ok(status.exit_code())
}
