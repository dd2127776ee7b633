use crate::config::types::{
    CategoryEntry, Config, CrawlerConfig, DiscoveryConfig, OutputConfig, SessionConfig,
    SiteConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_session_config(&config.session)?;
    validate_discovery_config(&config.discovery)?;
    validate_output_config(&config.output)?;
    validate_categories(&config.categories, &config.site.base_url)?;
    Ok(())
}

/// Validates the target site
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.base_url, "base-url")?;

    if !config.sitemap_path.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "sitemap-path must start with '/', got '{}'",
            config.sitemap_path
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > 32 {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and 32, got {}",
            config.max_workers
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.stagnation_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "stagnation-limit must be >= 1, got {}",
            config.stagnation_limit
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 1 and 120, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates session configuration
fn validate_session_config(config: &SessionConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    for cookie in &config.cookies {
        if cookie.name.is_empty() || cookie.name.contains(['=', ';', ' ']) {
            return Err(ConfigError::Validation(format!(
                "Invalid cookie name '{}'",
                cookie.name
            )));
        }
    }

    Ok(())
}

/// Validates discovery filters
fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.page_marker.is_empty() {
        return Err(ConfigError::Validation(
            "page-marker cannot be empty".to_string(),
        ));
    }

    if config.deny_keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "deny-keywords cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let is_set = |path: &Option<String>| path.as_deref().is_some_and(|p| !p.is_empty());

    if !is_set(&config.json_path) && !is_set(&config.csv_path) && !is_set(&config.database_path) {
        return Err(ConfigError::Validation(
            "at least one of json-path, csv-path or database-path must be set".to_string(),
        ));
    }

    Ok(())
}

/// Validates explicitly listed categories
fn validate_categories(entries: &[CategoryEntry], base_url: &Url) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.label.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "Category with URL '{}' has an empty label",
                entry.url
            )));
        }

        validate_http_url(&entry.url, "category url")?;

        if entry.url.host_str() != base_url.host_str() {
            return Err(ConfigError::InvalidUrl(format!(
                "Category '{}' points outside the site: {}",
                entry.label, entry.url
            )));
        }
    }

    Ok(())
}

/// Checks that a URL uses HTTP(S) and names a host
fn validate_http_url(url: &Url, field: &str) -> Result<(), ConfigError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} has no host: '{}'",
            field, url
        )));
    }

    Ok(())
}
