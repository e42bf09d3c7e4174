//! Login state machine.
//!
//! `Start -> SessionCheck? -> CredentialEntry -> Submitted -> {Success,
//! ChallengeRequired, Failure}`. `ChallengeRequired` suspends on the
//! [`ChallengeResolver`] and then waits once more, with a longer timeout, for
//! the authenticated marker.

use crate::challenge::ChallengeResolver;
use crate::error::{AuthError, Result};
use crate::session::{SessionState, SessionStore};
use chrono::Utc;
use jobtrail_browser::{BrowserActions, BrowserError, Pacing};
use jobtrail_core::{AuthConfig, Credentials};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;

/// Selectors and paths of the target site's login surface.
pub mod selectors {
    pub const LOGIN_PATH: &str = "/login";
    pub const SESSION_CHECK_PATH: &str = "/feed/";
    pub const USERNAME: &str = "#username";
    pub const PASSWORD: &str = "#password";
    pub const SUBMIT: &str = "button[type='submit']";
    /// Present only on authenticated pages
    pub const AUTH_MARKER: &str = "nav.global-nav";
    pub const LOGIN_ERROR: &str = ".form__label--error, .error-text, .alert";
}

static CHALLENGE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)checkpoint|challenge").expect("challenge regex is hardcoded and valid"));

static POST_LOGIN_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)feed|mynetwork").expect("post-login regex is hardcoded and valid"));

/// What the URL says about a login whose marker wait timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlClass {
    /// The site is demanding human verification
    Challenge,
    /// Already on a post-login page
    LoggedIn,
    Unknown,
}

/// Classify a post-submit URL. Challenge wins over post-login.
#[must_use]
pub fn classify_url(url: &str) -> UrlClass {
    if CHALLENGE_URL.is_match(url) {
        UrlClass::Challenge
    } else if POST_LOGIN_URL.is_match(url) {
        UrlClass::LoggedIn
    } else {
        UrlClass::Unknown
    }
}

/// How an authentication attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A stored session was accepted
    SessionReused,
    /// Credentials were accepted
    LoggedIn,
    /// A human cleared a verification challenge
    ChallengeCleared,
    /// Login did not succeed
    Failed(String),
}

impl LoginOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Drives one authentication attempt against the site.
pub struct LoginFlow<R> {
    config: AuthConfig,
    base_url: String,
    nav_timeout: Duration,
    pacing: Pacing,
    resolver: R,
    store: Option<SessionStore>,
}

impl<R: ChallengeResolver> LoginFlow<R> {
    pub fn new(
        config: AuthConfig,
        base_url: impl Into<String>,
        nav_timeout: Duration,
        pacing: Pacing,
        resolver: R,
    ) -> Self {
        Self {
            config,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            nav_timeout,
            pacing,
            resolver,
            store: None,
        }
    }

    /// Persist the session here after every credential login.
    #[must_use]
    pub fn with_session_store(mut self, store: SessionStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Authenticate, returning whether the browser is now logged in.
    ///
    /// Never fails: driver errors are logged and reported as `false`.
    pub async fn login<B>(
        &self,
        browser: &B,
        credentials: &Credentials,
        prior: Option<&SessionState>,
    ) -> bool
    where
        B: BrowserActions + ?Sized,
    {
        let outcome = self.authenticate(browser, credentials, prior).await;
        match &outcome {
            LoginOutcome::Failed(reason) => tracing::error!("Login failed: {}", reason),
            other => tracing::info!("Login successful ({:?})", other),
        }
        outcome.is_success()
    }

    /// Authenticate, reporting how the attempt ended.
    pub async fn authenticate<B>(
        &self,
        browser: &B,
        credentials: &Credentials,
        prior: Option<&SessionState>,
    ) -> LoginOutcome
    where
        B: BrowserActions + ?Sized,
    {
        if let Some(session) = prior.filter(|s| s.is_fresh(Utc::now())) {
            match self.check_session(browser, session).await {
                Ok(true) => return LoginOutcome::SessionReused,
                Ok(false) => tracing::info!("Stored session not accepted, logging in"),
                Err(e) => tracing::warn!("Session check failed, logging in: {}", e),
            }
        }

        let outcome = match self.credential_login(browser, credentials).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let url = browser.current_url().await.unwrap_or_default();
                tracing::error!(url = %url, error = ?e, "Login raised an error");
                LoginOutcome::Failed(e.to_string())
            }
        };

        if outcome.is_success() {
            self.persist_session(browser).await;
        }
        outcome
    }

    async fn check_session<B>(&self, browser: &B, session: &SessionState) -> Result<bool>
    where
        B: BrowserActions + ?Sized,
    {
        tracing::debug!(cookies = session.cookies.len(), "Trying stored session");
        browser.set_cookies(&session.cookies).await?;
        browser
            .navigate(&self.url(selectors::SESSION_CHECK_PATH), self.nav_timeout)
            .await?;

        match browser
            .wait_for(
                selectors::AUTH_MARKER,
                Duration::from_millis(self.config.session_check_timeout_ms),
            )
            .await
        {
            Ok(_) => Ok(true),
            Err(BrowserError::Timeout(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn credential_login<B>(&self, browser: &B, credentials: &Credentials) -> Result<LoginOutcome>
    where
        B: BrowserActions + ?Sized,
    {
        tracing::info!("Navigating to login page");
        browser
            .navigate(&self.url(selectors::LOGIN_PATH), self.nav_timeout)
            .await?;
        self.pacing.jitter().await;

        let username = browser
            .find(selectors::USERNAME)
            .await?
            .ok_or(AuthError::MissingControl(selectors::USERNAME))?;
        browser.fill(&username, &credentials.email).await?;
        self.pacing.jitter().await;

        let password = browser
            .find(selectors::PASSWORD)
            .await?
            .ok_or(AuthError::MissingControl(selectors::PASSWORD))?;
        browser.fill(&password, &credentials.password).await?;
        self.pacing.jitter().await;

        let submit = browser
            .find(selectors::SUBMIT)
            .await?
            .ok_or(AuthError::MissingControl(selectors::SUBMIT))?;
        browser.click(&submit).await?;
        tracing::debug!("Credentials submitted");

        if self
            .marker_appears(browser, self.config.login_timeout_ms)
            .await?
        {
            return Ok(LoginOutcome::LoggedIn);
        }

        let url = browser.current_url().await?;
        tracing::warn!(url = %url, "Authenticated marker did not appear");

        match classify_url(&url) {
            UrlClass::Challenge => self.handle_challenge(browser, &url).await,
            UrlClass::LoggedIn => {
                tracing::info!("Already on a post-login page");
                Ok(LoginOutcome::LoggedIn)
            }
            UrlClass::Unknown => Ok(LoginOutcome::Failed(self.login_error(browser).await?)),
        }
    }

    async fn handle_challenge<B>(&self, browser: &B, url: &str) -> Result<LoginOutcome>
    where
        B: BrowserActions + ?Sized,
    {
        self.resolver.await_resolution(url).await?;

        if self
            .marker_appears(browser, self.config.challenge_timeout_ms)
            .await?
        {
            Ok(LoginOutcome::ChallengeCleared)
        } else {
            let url = browser.current_url().await.unwrap_or_default();
            Ok(LoginOutcome::Failed(format!(
                "still not authenticated after verification (at {url})"
            )))
        }
    }

    async fn marker_appears<B>(&self, browser: &B, timeout_ms: u64) -> Result<bool>
    where
        B: BrowserActions + ?Sized,
    {
        match browser
            .wait_for(selectors::AUTH_MARKER, Duration::from_millis(timeout_ms))
            .await
        {
            Ok(_) => Ok(true),
            Err(BrowserError::Timeout(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn login_error<B>(&self, browser: &B) -> Result<String>
    where
        B: BrowserActions + ?Sized,
    {
        match browser.find(selectors::LOGIN_ERROR).await? {
            Some(element) => {
                let message = browser.inner_text(&element).await?;
                Ok(format!("site reported: {}", message.trim()))
            }
            None => Ok("no navigation detected".to_string()),
        }
    }

    async fn persist_session<B>(&self, browser: &B)
    where
        B: BrowserActions + ?Sized,
    {
        let Some(store) = &self.store else {
            return;
        };
        match SessionState::capture(browser).await {
            Ok(session) => store.save(&session),
            Err(e) => tracing::warn!("Could not capture session cookies: {}", e),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
