//! Category discovery
//!
//! Builds the label → URL map of catalog categories from the site's sitemap
//! page, falling back to the site root's navigation when the sitemap cannot
//! be fetched.

use crate::config::{CategoryEntry, DiscoveryConfig, SiteConfig};
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::selectors::{collapsed_text, LINK};
use crate::url::{is_same_site, resolve_link};
use crate::DiscoveryError;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// A catalog category to crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub label: String,
    pub url: Url,
}

impl Category {
    pub fn new(label: impl Into<String>, url: Url) -> Self {
        Self {
            label: label.into(),
            url,
        }
    }
}

/// Ordered, deduplicated set of categories
///
/// Labels are unique and no URL is registered under two labels. The first
/// registration wins in both cases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryMap {
    entries: Vec<Category>,
    labels: HashSet<String>,
    urls: HashSet<String>,
}

impl CategoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a category
    ///
    /// Returns false, leaving the map unchanged, when the label or the URL is
    /// already taken.
    pub fn insert(&mut self, category: Category) -> bool {
        if self.labels.contains(&category.label) || self.urls.contains(category.url.as_str()) {
            return false;
        }
        self.labels.insert(category.label.clone());
        self.urls.insert(category.url.to_string());
        self.entries.push(category);
        true
    }

    /// Looks up a category by label
    pub fn get(&self, label: &str) -> Option<&Category> {
        self.entries.iter().find(|c| c.label == label)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Category> {
        self.entries
    }
}

impl FromIterator<Category> for CategoryMap {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        let mut map = CategoryMap::new();
        for category in iter {
            map.insert(category);
        }
        map
    }
}

/// Discovers the category map of the site
///
/// # Process
///
/// 1. Fetch the sitemap page; on failure fetch the site root instead
/// 2. Keep every same-site `.html` link whose label and URL pass the denylist
/// 3. Deduplicate by first-seen label and first-seen URL
///
/// # Returns
///
/// * `Ok(CategoryMap)` - At least one category was found
/// * `Err(DiscoveryError::Unreachable)` - Neither document could be fetched
/// * `Err(DiscoveryError::NoCategories)` - The fetched document had no categories
pub async fn discover<F>(
    fetcher: &F,
    site: &SiteConfig,
    rules: &DiscoveryConfig,
) -> Result<CategoryMap, DiscoveryError>
where
    F: PageFetcher + ?Sized,
{
    let sitemap_url = site
        .base_url
        .join(&site.sitemap_path)
        .map_err(|e| DiscoveryError::InvalidSitemap {
            path: site.sitemap_path.clone(),
            message: e.to_string(),
        })?;

    let (document_url, body) = match fetcher.fetch(&sitemap_url).await {
        Ok(body) => (sitemap_url, body),
        Err(sitemap_error) => {
            tracing::warn!(
                "Sitemap unavailable ({}), falling back to {}",
                sitemap_error,
                site.base_url
            );
            match fetcher.fetch(&site.base_url).await {
                Ok(body) => (site.base_url.clone(), body),
                Err(root_error) => {
                    return Err(DiscoveryError::Unreachable {
                        sitemap: sitemap_error,
                        root: root_error,
                    })
                }
            }
        }
    };

    let categories = categories_from_document(&body, &site.base_url, rules);
    if categories.is_empty() {
        return Err(DiscoveryError::NoCategories {
            document: document_url.to_string(),
        });
    }

    tracing::info!(
        "Discovered {} categories from {}",
        categories.len(),
        document_url
    );
    Ok(categories)
}

/// Extracts the category map from a sitemap or menu document
///
/// Pure function of its inputs: the same document always yields an equal map.
pub fn categories_from_document(html: &str, site: &Url, rules: &DiscoveryConfig) -> CategoryMap {
    let document = Html::parse_document(html);
    let deny: Vec<String> = rules
        .deny_keywords
        .iter()
        .map(|keyword| keyword.to_lowercase())
        .collect();

    let mut map = CategoryMap::new();
    for link in document.select(&LINK) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        let Some(url) = resolve_link(href, site) else {
            continue;
        };

        let label = collapsed_text(&link);
        if is_category_link(&url, &label, site, rules, &deny) {
            let registered = map.insert(Category::new(label, url));
            if !registered {
                tracing::trace!("Duplicate category link skipped: {}", href);
            }
        }
    }
    map
}

/// Builds the category map from explicitly configured entries
pub fn categories_from_config(entries: &[CategoryEntry]) -> CategoryMap {
    entries
        .iter()
        .map(|entry| {
            let mut url = entry.url.clone();
            url.set_fragment(None);
            Category::new(entry.label.trim(), url)
        })
        .collect()
}

fn is_category_link(
    url: &Url,
    label: &str,
    site: &Url,
    rules: &DiscoveryConfig,
    deny: &[String],
) -> bool {
    if !is_same_site(url, site) {
        return false;
    }
    if label.chars().count() < rules.min_label_chars {
        return false;
    }
    // Host and query never decide: only the path and the visible label do
    let path = url.path().to_lowercase();
    if !path.contains(&rules.page_marker.to_lowercase()) {
        return false;
    }

    let lowered_label = label.to_lowercase();
    !deny
        .iter()
        .any(|keyword| path.contains(keyword) || lowered_label.contains(keyword))
}
