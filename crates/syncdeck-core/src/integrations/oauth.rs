//! Backend-brokered OAuth flow.
//!
//! 1. Asks the backend for the provider authorization URL
//! 2. Opens it in the browser
//! 3. Polls the backend until the provider callback has stored credentials
//!
//! The backend owns client secrets and the callback; this side only waits.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use super::backend::BackendClient;
use super::credentials::AuthCompleted;
use super::kind::IntegrationKind;
use super::traits::{CredentialFlow, Operator};
use crate::error::AuthError;
use crate::storage::config::AuthConfig;

type UrlHook = Arc<dyn Fn(IntegrationKind, &str) + Send + Sync>;

#[derive(Clone)]
pub struct OAuthFlow {
    backend: BackendClient,
    poll_interval: Duration,
    timeout: Duration,
    open_browser: bool,
    on_url: Option<UrlHook>,
}

impl OAuthFlow {
    pub fn new(backend: BackendClient, config: &AuthConfig) -> Self {
        Self {
            backend,
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            timeout: Duration::from_secs(config.timeout_secs),
            open_browser: config.open_browser,
            on_url: None,
        }
    }

    /// Called with the authorization URL before the browser is opened.
    pub fn on_authorization_url(
        mut self,
        hook: impl Fn(IntegrationKind, &str) + Send + Sync + 'static,
    ) -> Self {
        self.on_url = Some(Arc::new(hook));
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    async fn wait_for_credentials(
        &self,
        kind: IntegrationKind,
        operator: &Operator,
    ) -> Result<AuthCompleted, AuthError> {
        // A timeout past the end of the clock means no deadline at all.
        let deadline = Instant::now().checked_add(self.timeout);
        loop {
            if let Some(credentials) = self.backend.fetch_credentials(kind, operator).await? {
                info!(integration = %kind, user = %operator.user, "authorization completed");
                return Ok(AuthCompleted { kind, credentials });
            }
            if let Some(deadline) = deadline {
                let next_poll = Instant::now().checked_add(self.poll_interval);
                if next_poll.map_or(true, |next| next > deadline) {
                    return Err(AuthError::Timeout {
                        timeout_secs: self.timeout.as_secs(),
                    });
                }
            }
            sleep(self.poll_interval).await;
        }
    }
}

impl CredentialFlow for OAuthFlow {
    async fn authorize(
        &self,
        kind: IntegrationKind,
        operator: &Operator,
    ) -> Result<AuthCompleted, AuthError> {
        let url = self.backend.authorization_url(kind, operator).await?;
        info!(integration = %kind, %url, "authorization started");
        if let Some(hook) = &self.on_url {
            hook(kind, &url);
        }

        if self.open_browser {
            // A missing browser is not fatal; the URL is already on screen.
            if let Err(e) = open::that(&url) {
                warn!(error = %AuthError::Browser(e), "open the URL manually");
            }
        }

        self.wait_for_credentials(kind, operator).await
    }
}
