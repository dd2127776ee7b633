//! Shared request context
//!
//! A [`SessionContext`] is built once, after bootstrap, and then only read:
//! every fetch from every worker goes through the same client, header set and
//! cookie jar.

use crate::config::{Config, SessionConfig, SessionCookie};
use crate::BootstrapError;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Accept header sent with every request
pub const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

/// Header set, cookie jar and HTTP client shared by all fetches
#[derive(Debug, Clone)]
pub struct SessionContext {
    client: Client,
    site: Url,
    headers: HeaderMap,
    cookies: Vec<SessionCookie>,
}

impl SessionContext {
    /// Builds the context for the configured site with the given cookies
    ///
    /// # Arguments
    ///
    /// * `config` - The harvest configuration (site root, headers, timeout)
    /// * `cookies` - Cookies captured at bootstrap or listed in config
    ///
    /// # Returns
    ///
    /// * `Ok(SessionContext)` - Ready-to-share context
    /// * `Err(BootstrapError)` - A header value was invalid or the client failed to build
    pub fn new(config: &Config, cookies: Vec<SessionCookie>) -> Result<Self, BootstrapError> {
        let site = config.site.base_url.clone();
        let headers = build_headers(&config.session, &site)?;

        let jar = Arc::new(Jar::default());
        for cookie in &cookies {
            jar.add_cookie_str(&cookie_header(cookie), &site);
        }

        let client = build_http_client(
            headers.clone(),
            jar,
            Duration::from_secs(config.crawler.request_timeout_secs),
        )?;

        Ok(Self {
            client,
            site,
            headers,
            cookies,
        })
    }

    /// The HTTP client carrying the session's headers and cookies
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Site root every link is resolved against
    pub fn site(&self) -> &Url {
        &self.site
    }

    /// Header set attached to every request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Cookies loaded into the jar
    pub fn cookies(&self) -> &[SessionCookie] {
        &self.cookies
    }
}

/// Builds the browser-like header set
///
/// User-Agent, Accept, Accept-Language and a Referer pointing at the site root.
pub fn build_headers(session: &SessionConfig, site: &Url) -> Result<HeaderMap, BootstrapError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value("User-Agent", &session.user_agent)?);
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("Accept-Language", &session.accept_language)?,
    );
    headers.insert(REFERER, header_value("Referer", site.as_str())?);
    Ok(headers)
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, BootstrapError> {
    HeaderValue::from_str(value).map_err(|e| BootstrapError::InvalidHeader {
        name,
        message: e.to_string(),
    })
}

/// Builds an HTTP client with the session headers, cookie jar and timeout
pub fn build_http_client(
    headers: HeaderMap,
    jar: Arc<Jar>,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .default_headers(headers)
        .cookie_provider(jar)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

fn cookie_header(cookie: &SessionCookie) -> String {
    format!(
        "{}={}; Path={}",
        cookie.name,
        cookie.value,
        cookie.path.as_deref().unwrap_or("/")
    )
}
