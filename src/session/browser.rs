//! Chromium-backed session bootstrap
//!
//! Loads the site root in a real browser so that JavaScript challenge pages
//! can set their clearance cookies, then copies those cookies into the
//! HTTP session. Nothing here solves a challenge; it only waits for one to
//! pass on its own.

use crate::config::{Config, SessionCookie};
use crate::session::bootstrap::{Bootstrapped, Bootstrapper, BrowserProcess, SessionGuard};
use crate::session::SessionContext;
use crate::BootstrapError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
use futures::future::BoxFuture;
use futures::StreamExt;
use std::fmt::Display;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Hides the automation flag most bot checks look at first
const WEBDRIVER_MASK: &str =
    "Object.defineProperty(navigator, 'webdriver', {get: () => undefined})";

/// Upper bound on loading the site root, on top of the settle interval
const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Bootstraps sessions through a headless Chromium instance
#[derive(Debug, Default, Clone, Copy)]
pub struct ChromeBootstrapper;

struct ChromeProcess {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserProcess for ChromeProcess {
    fn terminate(self: Box<Self>) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            let ChromeProcess {
                mut browser,
                handler,
            } = *self;

            if let Err(e) = browser.close().await {
                tracing::warn!("Failed to close browser cleanly: {}", e);
            }
            if let Err(e) = browser.wait().await {
                tracing::warn!("Failed to reap browser process: {}", e);
            }
            handler.abort();
            tracing::debug!("Browser terminated");
        })
    }
}

#[async_trait]
impl Bootstrapper for ChromeBootstrapper {
    async fn bootstrap(&self, config: &Config) -> Result<Bootstrapped, BootstrapError> {
        tracing::info!("Launching browser to initialize session");

        let (browser, mut handler) = Browser::launch(browser_config(config)?)
            .await
            .map_err(|e| BootstrapError::BrowserLaunch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let captured = capture_cookies(&browser, config).await;
        let guard = SessionGuard::new(Box::new(ChromeProcess { browser, handler }));

        let cookies = match captured {
            Ok(cookies) => cookies,
            Err(e) => {
                guard.release().await;
                return Err(e);
            }
        };

        tracing::info!("Session initialized with {} cookies", cookies.len());

        match SessionContext::new(config, cookies) {
            Ok(session) => Ok(Bootstrapped { session, guard }),
            Err(e) => {
                guard.release().await;
                Err(e)
            }
        }
    }
}

fn browser_config(config: &Config) -> Result<BrowserConfig, BootstrapError> {
    let session = &config.session;

    let mut builder = BrowserConfig::builder()
        .no_sandbox()
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-dev-shm-usage")
        .arg(format!("--user-agent={}", session.user_agent))
        .request_timeout(NAVIGATION_TIMEOUT);

    if !session.headless {
        builder = builder.with_head();
    }

    if let Some(executable) = &session.chrome_executable {
        builder = builder.chrome_executable(executable);
    }

    builder.build().map_err(BootstrapError::BrowserLaunch)
}

/// Loads the site root, waits out the challenge, and reads back the cookie jar
async fn capture_cookies(
    browser: &Browser,
    config: &Config,
) -> Result<Vec<SessionCookie>, BootstrapError> {
    let root = config.site.base_url.as_str();

    let page = browser
        .new_page("about:blank")
        .await
        .map_err(|e| navigation_error(root, &e))?;

    page.evaluate_on_new_document(AddScriptToEvaluateOnNewDocumentParams::new(WEBDRIVER_MASK))
        .await
        .map_err(|e| navigation_error(root, &e))?;

    tracing::info!("Opening {}", root);
    tokio::time::timeout(NAVIGATION_TIMEOUT, page.goto(root))
        .await
        .map_err(|e| navigation_error(root, &e))?
        .map_err(|e| navigation_error(root, &e))?;

    tokio::time::sleep(Duration::from_secs(config.session.settle_secs)).await;

    let cookies = page.get_cookies().await.map_err(|e| navigation_error(root, &e))?;

    if let Err(e) = page.close().await {
        tracing::debug!("Failed to close bootstrap page: {}", e);
    }

    Ok(cookies
        .into_iter()
        .map(|cookie| SessionCookie {
            name: cookie.name,
            value: cookie.value,
            path: Some(cookie.path),
        })
        .collect())
}

fn navigation_error(url: &str, cause: &dyn Display) -> BootstrapError {
    BootstrapError::Navigation {
        url: url.to_string(),
        message: cause.to_string(),
    }
}
