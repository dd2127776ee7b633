//! Session module for acquiring a challenge-cleared HTTP context
//!
//! This module contains:
//! - The shared, read-only request context (headers, cookies, client)
//! - The bootstrap strategy trait and its release guard
//! - A direct (browserless) bootstrapper
//! - A Chromium bootstrapper, behind the `browser` feature

mod bootstrap;
#[cfg(feature = "browser")]
mod browser;
mod context;

pub use bootstrap::{Bootstrapped, Bootstrapper, BrowserProcess, DirectBootstrapper, SessionGuard};
#[cfg(feature = "browser")]
pub use browser::ChromeBootstrapper;
pub use context::{build_headers, build_http_client, SessionContext, ACCEPT_HTML};

#[cfg(test)]
pub(crate) use bootstrap::testing;

use crate::config::{Config, SessionMode};
use crate::BootstrapError;

/// Picks the bootstrapper for the configured session mode
///
/// # Returns
///
/// * `Ok(Box<dyn Bootstrapper>)` - Bootstrapper for the mode
/// * `Err(BootstrapError::BrowserUnavailable)` - Browser mode requested in a build without the `browser` feature
pub fn bootstrapper_for(config: &Config) -> Result<Box<dyn Bootstrapper>, BootstrapError> {
    match config.session.mode {
        SessionMode::Direct => Ok(Box::new(DirectBootstrapper)),
        #[cfg(feature = "browser")]
        SessionMode::Browser => Ok(Box::new(ChromeBootstrapper)),
        #[cfg(not(feature = "browser"))]
        SessionMode::Browser => Err(BootstrapError::BrowserUnavailable),
    }
}
