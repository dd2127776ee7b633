//! Catalog Harvester: a layout-tolerant product catalog crawler
//!
//! This crate bootstraps a browser-cleared session against a bot-defended
//! storefront, discovers its product categories, paginates through every
//! category concurrently, and extracts normalized product records from
//! semi-structured listing markup.

pub mod config;
pub mod crawler;
pub mod output;
pub mod product;
pub mod session;
pub mod state;
pub mod url;

use thiserror::Error;

/// Fatal errors that abort a whole harvest run
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("Category discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while acquiring a session
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Failed to launch browser: {0}")]
    BrowserLaunch(String),

    #[error("Browser support not compiled in; rebuild with the `browser` feature or use direct mode")]
    BrowserUnavailable,

    #[error("Failed to load {url} in browser: {message}")]
    Navigation { url: String, message: String },

    #[error("Invalid header value for {name}: {message}")]
    InvalidHeader { name: &'static str, message: String },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// A single failed request
///
/// Ends the pagination of the category that issued it, never the run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// The URL whose fetch failed
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Network { url, .. }
            | Self::Body { url, .. } => url,
        }
    }
}

/// Errors raised while building the category map
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Neither the sitemap nor the site root could be fetched (sitemap: {sitemap}; root: {root})")]
    Unreachable { sitemap: FetchError, root: FetchError },

    #[error("No catalog categories found in {document}")]
    NoCategories { document: String },

    #[error("Invalid sitemap path '{path}': {message}")]
    InvalidSitemap { path: String, message: String },
}

/// A category task that produced no usable data
///
/// Caught at the orchestrator's join point and converted into an empty
/// contribution; sibling categories keep running.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Category '{label}' is unreachable: {cause}")]
    Unreachable { label: String, cause: FetchError },

    #[error("Category '{label}' crawler panicked: {message}")]
    Panicked { label: String, message: String },

    #[error("Category '{label}' crawler was cancelled")]
    Cancelled { label: String },
}

impl CategoryError {
    /// Label of the category that failed
    pub fn label(&self) -> &str {
        match self {
            Self::Unreachable { label, .. }
            | Self::Panicked { label, .. }
            | Self::Cancelled { label } => label,
        }
    }
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{harvest, CrawlReport};
pub use product::ProductRecord;
pub use state::{CrawlPhase, RunStatus, StopReason};
