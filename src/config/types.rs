use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Main configuration structure for Catalog Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Explicit categories; when present, discovery is skipped
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryEntry>,
}

impl Config {
    /// Builds a configuration for the given site with every other section defaulted
    pub fn for_site(base_url: Url) -> Self {
        Self {
            site: SiteConfig {
                base_url,
                sitemap_path: default_sitemap_path(),
            },
            crawler: CrawlerConfig::default(),
            session: SessionConfig::default(),
            discovery: DiscoveryConfig::default(),
            extraction: ExtractionConfig::default(),
            output: OutputConfig::default(),
            categories: Vec::new(),
        }
    }
}

/// Target site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Site root; every request and every resolved link is anchored here
    #[serde(rename = "base-url")]
    pub base_url: Url,

    /// Path of the sitemap document, relative to the site root
    #[serde(rename = "sitemap-path", default = "default_sitemap_path")]
    pub sitemap_path: String,
}

fn default_sitemap_path() -> String {
    "/map.html".to_string()
}

/// Category traversal policy
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of categories crawled in parallel
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// Last page number fetched for any category
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Consecutive pages without unseen records before a category stops
    #[serde(rename = "stagnation-limit")]
    pub stagnation_limit: u32,

    /// Pause between two pages of the same category (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_workers: 5,
            max_pages: 50,
            stagnation_limit: 1,
            page_delay_ms: 500,
            request_timeout_secs: 15,
        }
    }
}

/// How the session is acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// Load the site in Chromium and capture the challenge-cleared cookies
    Browser,
    /// Plain HTTP with the configured headers and cookies
    Direct,
}

/// Session bootstrap configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mode: SessionMode,

    /// Time given to anti-bot challenge pages to resolve (seconds)
    #[serde(rename = "settle-secs")]
    pub settle_secs: u64,

    pub headless: bool,

    #[serde(rename = "user-agent")]
    pub user_agent: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Chromium binary; autodetected when unset
    #[serde(rename = "chrome-executable")]
    pub chrome_executable: Option<PathBuf>,

    /// Cookies attached in direct mode
    #[serde(rename = "cookie")]
    pub cookies: Vec<SessionCookie>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: SessionMode::Browser,
            settle_secs: 5,
            headless: true,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
            chrome_executable: None,
            cookies: Vec::new(),
        }
    }
}

/// A cookie carried by the session
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub path: Option<String>,
}

/// Link filtering rules for category discovery
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Links whose URL or label contains one of these are never categories
    #[serde(rename = "deny-keywords")]
    pub deny_keywords: Vec<String>,

    /// Substring every category URL must contain
    #[serde(rename = "page-marker")]
    pub page_marker: String,

    /// Minimum visible label length, in characters
    #[serde(rename = "min-label-chars")]
    pub min_label_chars: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            deny_keywords: [
                "login", "register", "cart", "checkout", "contact", "about", "blog", "news",
                "tel:", "mailto:",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            page_marker: ".html".to_string(),
            min_label_chars: 3,
        }
    }
}

/// Record extraction settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Stock value used when a card has no availability element
    #[serde(rename = "stock-placeholder")]
    pub stock_placeholder: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            stock_placeholder: crate::product::STOCK_UNSPECIFIED.to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-printed JSON array of products
    #[serde(rename = "json-path")]
    pub json_path: Option<String>,

    /// CSV table, one row per product
    #[serde(rename = "csv-path")]
    pub csv_path: Option<String>,

    /// SQLite database with run and product tables
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: Some("harvest/products.json".to_string()),
            csv_path: None,
            database_path: None,
        }
    }
}

/// A category listed explicitly in the configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryEntry {
    pub label: String,
    pub url: Url,
}
