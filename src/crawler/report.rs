//! Aggregated result of a harvest run

use crate::crawler::category::CategoryCrawl;
use crate::product::ProductRecord;
use crate::state::{RunStatus, StopReason};
use crate::CategoryError;
use url::Url;

/// How one successfully crawled category ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOutcome {
    pub label: String,
    pub url: Url,
    pub records: usize,
    pub pages_fetched: u32,
    pub stop_reason: StopReason,
}

/// Records and per-category outcomes collected by the orchestrator
///
/// Only the orchestrator appends to a report, one category at a time, as
/// category tasks complete.
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    records: Vec<ProductRecord>,
    outcomes: Vec<CategoryOutcome>,
    failures: Vec<CategoryError>,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the contribution of a finished category
    pub fn record_crawl(&mut self, crawl: CategoryCrawl) {
        self.outcomes.push(CategoryOutcome {
            label: crawl.category.label,
            url: crawl.category.url,
            records: crawl.records.len(),
            pages_fetched: crawl.pages_fetched,
            stop_reason: crawl.stop_reason,
        });
        self.records.extend(crawl.records);
    }

    /// Registers a category that contributed nothing
    pub fn record_failure(&mut self, error: CategoryError) {
        self.failures.push(error);
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn outcomes(&self) -> &[CategoryOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> &[CategoryError] {
        &self.failures
    }

    /// Number of categories attempted
    pub fn categories(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }

    /// Records contributed by the category with this label
    pub fn count_for(&self, label: &str) -> usize {
        self.records.iter().filter(|r| r.category == label).count()
    }

    /// `Partial` as soon as one category failed, `Failed` when none succeeded
    pub fn status(&self) -> RunStatus {
        if self.failures.is_empty() {
            RunStatus::Complete
        } else if self.outcomes.is_empty() {
            RunStatus::Failed
        } else {
            RunStatus::Partial
        }
    }

    pub fn into_records(self) -> Vec<ProductRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::discovery::Category;
    use crate::product::STOCK_UNSPECIFIED;

    fn record(name: &str, category: &str) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            url: None,
            price: None,
            image: None,
            in_stock: STOCK_UNSPECIFIED.to_string(),
            category: category.to_string(),
        }
    }

    fn crawl(label: &str, names: &[&str]) -> CategoryCrawl {
        CategoryCrawl {
            category: Category::new(
                label,
                Url::parse(&format!("https://shop.example.com/{label}.html")).unwrap(),
            ),
            records: names.iter().map(|name| record(name, label)).collect(),
            pages_fetched: 1,
            stop_reason: StopReason::NoPagination { page: 1 },
        }
    }

    #[test]
    fn test_empty_report_is_complete() {
        let report = CrawlReport::new();
        assert_eq!(report.status(), RunStatus::Complete);
        assert_eq!(report.categories(), 0);
        assert!(report.records().is_empty());
    }

    #[test]
    fn test_report_aggregates_categories() {
        let mut report = CrawlReport::new();
        report.record_crawl(crawl("pumps", &["a", "b"]));
        report.record_crawl(crawl("filters", &["c"]));

        assert_eq!(report.records().len(), 3);
        assert_eq!(report.count_for("pumps"), 2);
        assert_eq!(report.count_for("filters"), 1);
        assert_eq!(report.outcomes()[1].records, 1);
        assert_eq!(report.status(), RunStatus::Complete);
    }

    #[test]
    fn test_failure_makes_run_partial() {
        let mut report = CrawlReport::new();
        report.record_crawl(crawl("pumps", &["a"]));
        report.record_failure(CategoryError::Cancelled {
            label: "filters".to_string(),
        });

        assert_eq!(report.status(), RunStatus::Partial);
        assert_eq!(report.categories(), 2);
        assert_eq!(report.into_records().len(), 1);
    }

    #[test]
    fn test_every_category_failed() {
        let mut report = CrawlReport::new();
        for label in ["pumps", "filters"] {
            report.record_failure(CategoryError::Cancelled {
                label: label.to_string(),
            });
        }

        assert_eq!(report.status(), RunStatus::Failed);
        assert_eq!(report.status().exit_status(), 1);
        assert!(report.records().is_empty());
    }

    #[test]
    fn test_empty_successful_category_is_not_failure() {
        let mut report = CrawlReport::new();
        report.record_crawl(crawl("pumps", &[]));
        report.record_failure(CategoryError::Cancelled {
            label: "filters".to_string(),
        });
        assert_eq!(report.status(), RunStatus::Partial);
    }
}
