//! Crawl orchestration
//!
//! The coordinator runs a harvest end to end:
//! - Bootstraps the session once
//! - Discovers categories once (or takes them from the config)
//! - Fans out one category crawl per category over a bounded worker pool
//! - Collects every contribution as the tasks complete
//! - Releases the session on every path

use crate::config::Config;
use crate::crawler::category::{CategoryCrawler, CrawlPolicy};
use crate::crawler::discovery::{categories_from_config, discover, CategoryMap};
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::report::CrawlReport;
use crate::session::{Bootstrapped, Bootstrapper};
use crate::{CategoryError, HarvestError};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::any::Any;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Main harvest coordinator
pub struct Coordinator {
    config: Arc<Config>,
    bootstrapper: Box<dyn Bootstrapper>,
}

impl Coordinator {
    /// Creates a coordinator for a validated configuration
    pub fn new(config: Config, bootstrapper: Box<dyn Bootstrapper>) -> Self {
        Self {
            config: Arc::new(config),
            bootstrapper,
        }
    }

    /// Runs bootstrap, discovery and every category crawl
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - All categories were attempted; check
    ///   [`CrawlReport::status`] for failures
    /// * `Err(HarvestError)` - Bootstrap or discovery failed
    pub async fn run(&self) -> Result<CrawlReport, HarvestError> {
        let Bootstrapped { session, guard } = self.bootstrapper.bootstrap(&self.config).await?;

        let result = self.crawl_site(Arc::new(session)).await;
        guard.release().await;

        if let Ok(report) = &result {
            tracing::info!(
                "Harvest finished: {} records from {} categories ({} failed)",
                report.records().len(),
                report.categories(),
                report.failures().len()
            );
        }
        result
    }

    /// Discovers and crawls every category through `fetcher`
    pub async fn crawl_site<F>(&self, fetcher: Arc<F>) -> Result<CrawlReport, HarvestError>
    where
        F: PageFetcher + ?Sized + 'static,
    {
        let categories = if self.config.categories.is_empty() {
            discover(fetcher.as_ref(), &self.config.site, &self.config.discovery).await?
        } else {
            tracing::info!(
                "Using {} configured categories, skipping discovery",
                self.config.categories.len()
            );
            categories_from_config(&self.config.categories)
        };

        let extractor = Arc::new(Extractor::new(
            self.config.site.base_url.clone(),
            self.config.extraction.stock_placeholder.clone(),
        ));

        Ok(crawl_categories(
            fetcher,
            categories,
            extractor,
            CrawlPolicy::from(&self.config.crawler),
            self.config.crawler.max_workers,
        )
        .await)
    }
}

/// Crawls every category with at most `max_workers` running at once
///
/// Each category runs in its own task. A task that fails or panics is logged
/// with its label and counted as an empty contribution; the remaining tasks
/// keep running.
pub async fn crawl_categories<F>(
    fetcher: Arc<F>,
    categories: CategoryMap,
    extractor: Arc<Extractor>,
    policy: CrawlPolicy,
    max_workers: usize,
) -> CrawlReport
where
    F: PageFetcher + ?Sized + 'static,
{
    let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
    let crawler = CategoryCrawler::new(fetcher, extractor, policy);

    tracing::info!(
        "Crawling {} categories with {} workers",
        categories.len(),
        max_workers
    );

    let mut pending = FuturesUnordered::new();
    for category in categories.into_vec() {
        let crawler = crawler.clone();
        let semaphore = Arc::clone(&semaphore);
        let label = category.label.clone();

        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return Err(CategoryError::Cancelled {
                        label: category.label,
                    })
                }
            };
            crawler.crawl(&category).await
        });

        pending.push(async move { (label, handle.await) });
    }

    let mut report = CrawlReport::new();
    while let Some((label, joined)) = pending.next().await {
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(join_error) if join_error.is_panic() => Err(CategoryError::Panicked {
                label,
                message: panic_message(join_error.into_panic()),
            }),
            Err(_) => Err(CategoryError::Cancelled { label }),
        };

        match outcome {
            Ok(crawl) => {
                tracing::info!(
                    "'{}': {} records ({})",
                    crawl.category.label,
                    crawl.records.len(),
                    crawl.stop_reason
                );
                report.record_crawl(crawl);
            }
            Err(error) => {
                tracing::error!("{}", error);
                report.record_failure(error);
            }
        }
    }

    report
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
