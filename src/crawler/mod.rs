//! Crawler module for category discovery, pagination and extraction
//!
//! This module contains the core harvesting logic, including:
//! - Page fetching through the shared session
//! - Category discovery from the sitemap
//! - Product card location and record extraction
//! - Per-category pagination and the concurrent orchestrator

mod category;
mod coordinator;
mod discovery;
mod extractor;
mod fetcher;
mod report;
pub mod selectors;

pub use category::{scan_page, CategoryCrawl, CategoryCrawler, CrawlPolicy, PageScan};
pub use coordinator::{crawl_categories, Coordinator};
pub use discovery::{
    categories_from_config, categories_from_document, discover, Category, CategoryMap,
};
pub use extractor::{
    currency_text, first_link, normalize_price, price_class_text, stock_class_text,
    titled_element, ElementStrategy, Extractor, TextStrategy, NAME_STRATEGIES, PRICE_STRATEGIES,
    STOCK_STRATEGIES,
};
pub use fetcher::{fetch_page, PageFetcher};
pub use report::{CategoryOutcome, CrawlReport};

use crate::config::Config;
use crate::output;
use crate::session::Bootstrapper;
use crate::HarvestError;
use chrono::Utc;

/// Runs a complete harvest and writes its outputs
///
/// This is the main entry point for a run. It will:
/// 1. Bootstrap the session
/// 2. Discover the categories
/// 3. Crawl every category concurrently
/// 4. Write the configured JSON and SQLite outputs
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `config_hash` - Hash of the configuration file, recorded with the run
/// * `bootstrapper` - Session acquisition strategy
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run finished; it may still be partial
/// * `Err(HarvestError)` - A fatal error aborted the run
pub async fn harvest(
    config: Config,
    config_hash: &str,
    bootstrapper: Box<dyn Bootstrapper>,
) -> Result<CrawlReport, HarvestError> {
    let started_at = Utc::now();
    let output_config = config.output.clone();

    let report = Coordinator::new(config, bootstrapper).run().await?;
    output::write_outputs(&output_config, &report, config_hash, started_at)?;

    Ok(report)
}
