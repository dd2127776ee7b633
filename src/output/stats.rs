//! Harvest statistics
//!
//! Computed from a finished [`CrawlReport`] and printed at the end of a run.

use crate::crawler::CrawlReport;
use crate::state::RunStatus;
use std::collections::BTreeMap;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct HarvestStatistics {
    /// Total number of records harvested
    pub total_records: usize,

    /// Records per category label
    pub records_by_category: BTreeMap<String, usize>,

    /// Pages fetched per category label
    pub pages_by_category: BTreeMap<String, u32>,

    pub with_price: usize,
    pub with_image: usize,
    pub with_url: usize,

    /// Records whose stock text is not the placeholder
    pub with_explicit_stock: usize,

    /// Failed categories with their error messages
    pub failed_categories: Vec<(String, String)>,

    pub status: RunStatus,
}

impl HarvestStatistics {
    /// Computes statistics from a report
    ///
    /// # Arguments
    ///
    /// * `report` - The finished harvest report
    /// * `stock_placeholder` - Stock text meaning "unknown"
    pub fn from_report(report: &CrawlReport, stock_placeholder: &str) -> Self {
        let records = report.records();

        let mut records_by_category = BTreeMap::new();
        let mut pages_by_category = BTreeMap::new();
        for outcome in report.outcomes() {
            records_by_category.insert(outcome.label.clone(), outcome.records);
            pages_by_category.insert(outcome.label.clone(), outcome.pages_fetched);
        }
        for failure in report.failures() {
            records_by_category.insert(failure.label().to_string(), 0);
        }

        Self {
            total_records: records.len(),
            records_by_category,
            pages_by_category,
            with_price: records.iter().filter(|r| r.price.is_some()).count(),
            with_image: records.iter().filter(|r| r.image.is_some()).count(),
            with_url: records.iter().filter(|r| r.url.is_some()).count(),
            with_explicit_stock: records
                .iter()
                .filter(|r| !r.stock_is_unspecified(stock_placeholder))
                .count(),
            failed_categories: report
                .failures()
                .iter()
                .map(|f| (f.label().to_string(), f.to_string()))
                .collect(),
            status: report.status(),
        }
    }

    /// Share of records with a price, as a percentage
    pub fn price_coverage(&self) -> f64 {
        percentage(self.with_price, self.total_records)
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64) * 100.0
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Status: {}", stats.status);
    println!("  Total records: {}", stats.total_records);
    println!(
        "  Categories: {} ({} failed)",
        stats.records_by_category.len(),
        stats.failed_categories.len()
    );
    println!();

    println!("Records by Category:");
    // Sort categories by count (descending)
    let mut category_counts: Vec<_> = stats.records_by_category.iter().collect();
    category_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (label, count) in category_counts {
        match stats.pages_by_category.get(label) {
            Some(pages) => println!("  {}: {} ({} pages)", label, count, pages),
            None => println!("  {}: {}", label, count),
        }
    }
    println!();

    println!("Field Coverage:");
    for (field, count) in [
        ("price", stats.with_price),
        ("image", stats.with_image),
        ("url", stats.with_url),
        ("explicit stock", stats.with_explicit_stock),
    ] {
        println!(
            "  {}: {} ({:.1}%)",
            field,
            count,
            percentage(count, stats.total_records)
        );
    }
    println!();

    if !stats.failed_categories.is_empty() {
        println!("Failed Categories ({}):", stats.failed_categories.len());
        for (label, message) in &stats.failed_categories {
            println!("  - {}: {}", label, message);
        }
        println!();
    }
}
