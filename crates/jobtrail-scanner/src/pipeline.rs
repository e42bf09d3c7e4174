//! The scrape run: launch, login, search, filter, with whole-run retries.

use crate::collector::Collector;
use crate::error::Result;
use crate::filter::ListingFilter;
use crate::retry::retry_with_backoff;
use async_trait::async_trait;
use jobtrail_auth::{ChallengeResolver, LoginFlow, SessionStore};
use jobtrail_browser::{BrowserActions, BrowserEngine, BrowserError, Pacing};
use jobtrail_core::{AppConfig, BrowserConfig, Credentials, ListingRecord, RetryPolicy, SearchQuery};

/// Acquires and releases the browser for one attempt.
#[async_trait]
pub trait DriverFactory: Send + Sync {
    type Driver: BrowserActions;

    async fn launch(&self) -> std::result::Result<Self::Driver, BrowserError>;

    /// Tear the driver down. Called on every exit path of an attempt.
    async fn release(&self, driver: Self::Driver);
}

/// Launches a local Chrome per attempt.
#[derive(Debug, Clone)]
pub struct ChromeFactory {
    config: BrowserConfig,
}

impl ChromeFactory {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverFactory for ChromeFactory {
    type Driver = BrowserEngine;

    async fn launch(&self) -> std::result::Result<BrowserEngine, BrowserError> {
        BrowserEngine::launch(&self.config).await
    }

    async fn release(&self, driver: BrowserEngine) {
        if let Err(e) = driver.shutdown().await {
            tracing::warn!("Browser shutdown failed: {}", e);
        }
    }
}

/// Login followed by every configured search, retried as a unit.
pub struct ScrapePipeline<F, R> {
    factory: F,
    login: LoginFlow<R>,
    session_store: SessionStore,
    collector: Collector,
    filter: ListingFilter,
    queries: Vec<SearchQuery>,
    retry: RetryPolicy,
    credentials: Option<Credentials>,
}

impl<F, R> ScrapePipeline<F, R>
where
    F: DriverFactory,
    R: ChallengeResolver,
{
    pub fn new(config: &AppConfig, factory: F, resolver: R, session_store: SessionStore) -> Self {
        let pacing = Pacing::new(config.pacing.clone());
        let nav_timeout = config.browser.timeout();

        Self {
            factory,
            login: LoginFlow::new(
                config.auth.clone(),
                config.search.base_url.clone(),
                nav_timeout,
                pacing.clone(),
                resolver,
            )
            .with_session_store(session_store.clone()),
            session_store,
            collector: Collector::new(config.search.clone(), nav_timeout, pacing),
            filter: ListingFilter::new(&config.search.blacklist_companies),
            queries: SearchQuery::cross_product(&config.search.keywords, &config.search.locations),
            retry: config.retry.clone(),
            credentials: config.credentials.clone(),
        }
    }

    /// Scrape all queries and return the filtered listings.
    ///
    /// Missing credentials and other permanent failures yield an empty
    /// result. Transient failures are retried per the policy; the last one
    /// is returned once attempts run out.
    pub async fn run(&self) -> Result<Vec<ListingRecord>> {
        let Some(credentials) = self.credentials.as_ref() else {
            tracing::warn!("Credentials not found; set JOBTRAIL_EMAIL and JOBTRAIL_PASSWORD");
            return Ok(Vec::new());
        };

        match retry_with_backoff(&self.retry, || self.attempt(credentials)).await {
            Ok(raw) => {
                let filtered = self.filter.apply(raw);
                tracing::info!(count = filtered.len(), "Unique listings after filtering");
                Ok(filtered)
            }
            Err(e) if e.is_transient() => Err(e),
            Err(e) => {
                tracing::error!("Scrape aborted: {}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn attempt(&self, credentials: &Credentials) -> Result<Vec<ListingRecord>> {
        let driver = self.factory.launch().await?;
        let result = self.login_and_search(&driver, credentials).await;
        self.factory.release(driver).await;
        result
    }

    async fn login_and_search(
        &self,
        driver: &F::Driver,
        credentials: &Credentials,
    ) -> Result<Vec<ListingRecord>> {
        let prior = self.session_store.load();
        if !self.login.login(driver, credentials, prior.as_ref()).await {
            return Ok(Vec::new());
        }
        self.collector.collect(driver, &self.queries).await
    }
}
