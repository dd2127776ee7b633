//! Per-category pagination
//!
//! A [`CategoryCrawler`] walks one category page by page, strictly in
//! ascending order, until one of the [`StopReason`]s applies.

use crate::config::CrawlerConfig;
use crate::crawler::discovery::Category;
use crate::crawler::extractor::{names_product, Extractor};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::selectors::{
    class_matches, collapsed_text, descendant_elements, CARD_HINT, CURRENCY_AMOUNT, DIV, LINK,
    NEXT_HINT, PAGER_HINT,
};
use crate::product::ProductRecord;
use crate::state::{CrawlPhase, StopReason};
use crate::url::page_url;
use crate::CategoryError;
use scraper::{ElementRef, Html};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Limits applied to every category crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlPolicy {
    /// Last page number that may be fetched (inclusive)
    pub max_pages: u32,

    /// Consecutive pages without new records that end a category
    pub stagnation_limit: u32,

    /// Pause between two page requests of the same category
    pub page_delay: Duration,
}

impl From<&CrawlerConfig> for CrawlPolicy {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            stagnation_limit: config.stagnation_limit,
            page_delay: Duration::from_millis(config.page_delay_ms),
        }
    }
}

impl Default for CrawlPolicy {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

/// Outcome of crawling one category
#[derive(Debug, Clone)]
pub struct CategoryCrawl {
    pub category: Category,
    pub records: Vec<ProductRecord>,
    pub pages_fetched: u32,
    pub stop_reason: StopReason,
}

/// What a single listing page contained
#[derive(Debug, Clone, Default)]
pub struct PageScan {
    /// Number of product cards located
    pub cards: usize,

    /// Records extracted from those cards, category not yet assigned
    pub records: Vec<ProductRecord>,

    /// Cards that yielded no record
    pub misses: usize,

    /// Whether the page advertises a following page
    pub has_pagination: bool,
}

/// Crawls the pages of a single category
pub struct CategoryCrawler<F: ?Sized> {
    fetcher: Arc<F>,
    extractor: Arc<Extractor>,
    policy: CrawlPolicy,
}

impl<F: ?Sized> Clone for CategoryCrawler<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            extractor: Arc::clone(&self.extractor),
            policy: self.policy,
        }
    }
}

impl<F> CategoryCrawler<F>
where
    F: PageFetcher + ?Sized,
{
    pub fn new(fetcher: Arc<F>, extractor: Arc<Extractor>, policy: CrawlPolicy) -> Self {
        Self {
            fetcher,
            extractor,
            policy,
        }
    }

    /// Crawls `category` until a stop condition applies
    ///
    /// # Returns
    ///
    /// * `Ok(CategoryCrawl)` - Records of every page fetched, including pages
    ///   fetched before a later request failed
    /// * `Err(CategoryError::Unreachable)` - The first page could not be fetched
    pub async fn crawl(&self, category: &Category) -> Result<CategoryCrawl, CategoryError> {
        tracing::info!("Crawling category '{}'", category.label);

        let mut phase = CrawlPhase::FetchingPage;
        let mut seen = HashSet::new();
        let mut records = Vec::new();
        let mut pages_fetched = 0;
        let mut stale_pages = 0;
        let mut page = 1;

        let stop_reason = loop {
            let url = page_url(&category.url, page);
            tracing::debug!("Fetching page {} of '{}': {}", page, category.label, url);

            let body = match self.fetcher.fetch(&url).await {
                Ok(body) => body,
                Err(cause) if page == 1 => {
                    return Err(CategoryError::Unreachable {
                        label: category.label.clone(),
                        cause,
                    });
                }
                Err(cause) => {
                    tracing::warn!(
                        "Stopping '{}' after page {}: {}",
                        category.label,
                        page - 1,
                        cause
                    );
                    break StopReason::FetchFailed { page };
                }
            };
            pages_fetched = page;

            phase = phase.advance(CrawlPhase::Extracting);
            let scan = scan_page(&body, &self.extractor);

            if scan.cards == 0 {
                if page == 1 {
                    tracing::warn!("No product cards on the first page of '{}'", category.label);
                }
                break StopReason::NoCards { page };
            }

            let mut fresh = 0;
            for record in scan.records {
                let record = record.in_category(&category.label);
                if seen.insert(record.key()) {
                    records.push(record);
                    fresh += 1;
                }
            }
            tracing::debug!(
                "Page {} of '{}': {} cards, {} new records, {} misses",
                page,
                category.label,
                scan.cards,
                fresh,
                scan.misses
            );

            phase = phase.advance(CrawlPhase::DecidingContinuation);

            if fresh == 0 {
                stale_pages += 1;
                if stale_pages >= self.policy.stagnation_limit {
                    break StopReason::Stagnated { page };
                }
            } else {
                stale_pages = 0;
            }

            if !scan.has_pagination {
                break StopReason::NoPagination { page };
            }

            if page >= self.policy.max_pages {
                break StopReason::PageCeiling { page };
            }

            phase = phase.advance(CrawlPhase::FetchingPage);
            page += 1;

            if !self.policy.page_delay.is_zero() {
                tokio::time::sleep(self.policy.page_delay).await;
            }
        };
        phase.advance(CrawlPhase::Done);

        tracing::info!(
            "Category '{}' finished: {} records from {} pages ({})",
            category.label,
            records.len(),
            pages_fetched,
            stop_reason
        );

        Ok(CategoryCrawl {
            category: category.clone(),
            records,
            pages_fetched,
            stop_reason,
        })
    }
}

/// Locates cards, extracts records, and detects pagination on one page
///
/// Kept synchronous: the parsed document is not `Send` and must never live
/// across an await point.
pub fn scan_page(html: &str, extractor: &Extractor) -> PageScan {
    let document = Html::parse_document(html);

    let mut cards = class_cards(&document);
    if cards.is_empty() {
        cards = structural_cards(&document);
    }

    let mut records = Vec::with_capacity(cards.len());
    let mut misses = 0;
    for card in &cards {
        match extractor.extract(*card) {
            Some(record) => records.push(record),
            None => {
                misses += 1;
                tracing::debug!("No product name in card <{}>", card.value().name());
            }
        }
    }

    PageScan {
        cards: cards.len(),
        records,
        misses,
        has_pagination: has_pagination(&document),
    }
}

/// Outermost elements whose class looks like a product card
fn class_cards(document: &Html) -> Vec<ElementRef<'_>> {
    descendant_elements(document.root_element())
        .filter(|e| class_matches(e, &CARD_HINT))
        .filter(|e| {
            !e.ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| class_matches(&ancestor, &CARD_HINT))
        })
        .collect()
}

/// Innermost nameable `div`s holding both an image and a price
///
/// A media block wrapping only the picture and price is not a card by itself;
/// the tile around it that also carries the title is. Listing wrappers are
/// dropped because they contain such tiles.
fn structural_cards(document: &Html) -> Vec<ElementRef<'_>> {
    let candidates: Vec<ElementRef<'_>> = document
        .select(&DIV)
        .filter(|div| looks_like_card(div) && names_product(*div))
        .collect();

    candidates
        .iter()
        .filter(|div| {
            !candidates
                .iter()
                .any(|inner| is_ancestor(div, inner))
        })
        .copied()
        .collect()
}

fn looks_like_card(div: &ElementRef<'_>) -> bool {
    descendant_elements(*div).any(|e| e.value().name() == "img")
        && CURRENCY_AMOUNT.is_match(&collapsed_text(div))
}

fn is_ancestor(outer: &ElementRef<'_>, inner: &ElementRef<'_>) -> bool {
    inner.ancestors().any(|node| node.id() == outer.id())
}

fn has_pagination(document: &Html) -> bool {
    let next_link = document.select(&LINK).any(|a| {
        class_matches(&a, &NEXT_HINT) || a.value().attr("rel") == Some("next")
    });

    next_link
        || descendant_elements(document.root_element()).any(|e| class_matches(&e, &PAGER_HINT))
}
