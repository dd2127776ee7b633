//! HTTP fetcher implementation
//!
//! This module handles all page requests for the crawler:
//! - The [`PageFetcher`] seam used by discovery and category crawls
//! - GET requests through the shared session context
//! - Error classification into [`FetchError`]

use crate::session::SessionContext;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Source of page bodies
///
/// Implementations must be safe to call concurrently from every worker.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and returns its body
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

#[async_trait]
impl PageFetcher for SessionContext {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        fetch_page(self.client(), url).await
    }
}

/// Fetches a URL and returns its body
///
/// # Error Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | Non-2xx status | `FetchError::Status` |
/// | Client timeout | `FetchError::Timeout` |
/// | Connect/transport failure | `FetchError::Network` |
/// | Body could not be read or decoded | `FetchError::Body` |
///
/// Redirects are followed by the client.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url, &e))?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!("Request to {} failed: HTTP {}", url, status.as_u16());
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })
}

fn classify_error(url: &Url, error: &reqwest::Error) -> FetchError {
    let fetch_error = if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    };
    tracing::warn!("{}", fetch_error);
    fetch_error
}
