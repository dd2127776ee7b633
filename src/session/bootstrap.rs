//! Session acquisition
//!
//! Bootstrapping is a scoped acquisition: it yields an immutable
//! [`SessionContext`] plus a [`SessionGuard`] owning whatever external process
//! was started to obtain it. The guard terminates that process on
//! [`SessionGuard::release`], or from `Drop` when the owner bails out early.

use crate::config::Config;
use crate::session::SessionContext;
use crate::BootstrapError;
use async_trait::async_trait;
use futures::future::BoxFuture;

/// An external process backing a session (a browser, in practice)
pub trait BrowserProcess: Send {
    /// Shuts the process down
    fn terminate(self: Box<Self>) -> BoxFuture<'static, ()>;
}

/// Release handle for a bootstrapped session
pub struct SessionGuard {
    process: Option<Box<dyn BrowserProcess>>,
}

impl SessionGuard {
    /// Guards the given process
    pub fn new(process: Box<dyn BrowserProcess>) -> Self {
        Self {
            process: Some(process),
        }
    }

    /// A guard with nothing to release
    pub fn detached() -> Self {
        Self { process: None }
    }

    /// Returns true if a process is still owned by this guard
    pub fn is_attached(&self) -> bool {
        self.process.is_some()
    }

    /// Terminates the guarded process and waits for it
    pub async fn release(mut self) {
        if let Some(process) = self.process.take() {
            tracing::debug!("Terminating session browser");
            process.terminate().await;
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(process) = self.process.take() {
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    tracing::warn!("Session guard dropped without release, terminating browser");
                    handle.spawn(process.terminate());
                }
                Err(_) => {
                    tracing::error!("Session guard dropped outside a runtime; browser may outlive the run");
                }
            }
        }
    }
}

impl std::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGuard")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// A bootstrapped session: the shared context and its release handle
#[derive(Debug)]
pub struct Bootstrapped {
    pub session: SessionContext,
    pub guard: SessionGuard,
}

/// Strategy for acquiring a session before any catalog fetch
#[async_trait]
pub trait Bootstrapper: Send + Sync {
    /// Acquires a session for the configured site
    ///
    /// Failure is fatal to the run.
    async fn bootstrap(&self, config: &Config) -> Result<Bootstrapped, BootstrapError>;
}

/// Builds the session from configured headers and cookies, without a browser
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectBootstrapper;

#[async_trait]
impl Bootstrapper for DirectBootstrapper {
    async fn bootstrap(&self, config: &Config) -> Result<Bootstrapped, BootstrapError> {
        let session = SessionContext::new(config, config.session.cookies.clone())?;
        tracing::info!(
            "Direct session ready for {} ({} configured cookies)",
            session.site(),
            session.cookies().len()
        );

        Ok(Bootstrapped {
            session,
            guard: SessionGuard::detached(),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Process stand-in that records its termination
    pub struct FlagProcess(pub Arc<AtomicBool>);

    impl BrowserProcess for FlagProcess {
        fn terminate(self: Box<Self>) -> BoxFuture<'static, ()> {
            Box::pin(async move {
                self.0.store(true, Ordering::SeqCst);
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FlagProcess;
    use super::*;
    use crate::config::SessionCookie;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;

    #[tokio::test]
    async fn test_release_terminates_process() {
        let terminated = Arc::new(AtomicBool::new(false));
        let guard = SessionGuard::new(Box::new(FlagProcess(terminated.clone())));
        assert!(guard.is_attached());

        guard.release().await;
        assert!(terminated.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_drop_terminates_process() {
        let terminated = Arc::new(AtomicBool::new(false));
        {
            let _guard = SessionGuard::new(Box::new(FlagProcess(terminated.clone())));
        }

        for _ in 0..50 {
            if terminated.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(terminated.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_detached_guard_release_is_noop() {
        let guard = SessionGuard::detached();
        assert!(!guard.is_attached());
        guard.release().await;
    }

    #[tokio::test]
    async fn test_direct_bootstrap_uses_configured_cookies() {
        let mut config = Config::for_site(Url::parse("https://shop.example.com").unwrap());
        config.session.cookies.push(SessionCookie {
            name: "sid".to_string(),
            value: "abc".to_string(),
            path: None,
        });

        let bootstrapped = DirectBootstrapper.bootstrap(&config).await.unwrap();
        assert_eq!(bootstrapped.session.cookies().len(), 1);
        assert!(!bootstrapped.guard.is_attached());
    }
}
