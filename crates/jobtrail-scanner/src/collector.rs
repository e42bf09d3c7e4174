//! Extraction of listing cards from search results pages.

use crate::error::Result;
use crate::url_builder::build_search_url;
use jobtrail_browser::{BrowserActions, BrowserError, Pacing};
use jobtrail_core::{ListingRecord, SearchConfig, SearchQuery};
use std::time::Duration;

/// Selectors of the public job search results page.
pub mod selectors {
    pub const RESULTS_CONTAINER: &str = ".jobs-search__results-list";
    pub const CARD: &str = ".job-search-card";
    pub const TITLE: &str = ".base-search-card__title";
    pub const COMPANY: &str = ".base-search-card__subtitle";
    pub const LOCATION: &str = ".job-search-card__location";
    pub const LINK: &str = "a.base-card__full-link";
    pub const POSTED: &str = "time";
    pub const SALARY: &str = ".job-search-card__salary-info";
}

/// How long to wait for the results list before treating a query as empty.
pub const RESULTS_TIMEOUT: Duration = Duration::from_secs(10);

/// Vertical offset of one "load more" scroll.
const SCROLL_STEP: i64 = 10_000;

/// Runs search queries and extracts listing records.
pub struct Collector {
    config: SearchConfig,
    nav_timeout: Duration,
    pacing: Pacing,
}

impl Collector {
    pub fn new(config: SearchConfig, nav_timeout: Duration, pacing: Pacing) -> Self {
        Self {
            config,
            nav_timeout,
            pacing,
        }
    }

    /// Run every query in order and concatenate the raw results.
    ///
    /// A query with no results doesn't stop the others. Navigation failures
    /// propagate so the caller can retry the whole run.
    pub async fn collect<B>(&self, browser: &B, queries: &[SearchQuery]) -> Result<Vec<ListingRecord>>
    where
        B: BrowserActions + ?Sized,
    {
        let mut listings = Vec::new();

        for query in queries {
            tracing::info!(query = %query, "Searching");
            let found = self.collect_query(browser, query).await?;
            tracing::info!(query = %query, count = found.len(), "Search complete");
            listings.extend(found);
            self.pacing.pause(self.pacing.config().between_queries_ms).await;
        }

        Ok(listings)
    }

    /// Extract up to `max_results_per_query` listings for one query.
    pub async fn collect_query<B>(&self, browser: &B, query: &SearchQuery) -> Result<Vec<ListingRecord>>
    where
        B: BrowserActions + ?Sized,
    {
        let url = build_search_url(&self.config.base_url, query);
        browser.navigate(&url, self.nav_timeout).await?;

        match browser
            .wait_for(selectors::RESULTS_CONTAINER, RESULTS_TIMEOUT)
            .await
        {
            Ok(_) => {}
            Err(BrowserError::Timeout(_)) => {
                tracing::info!(query = %query, "No results found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        }

        for _ in 0..self.config.scroll_cycles {
            browser.scroll_by(0, SCROLL_STEP).await?;
            self.pacing.pause(self.pacing.config().scroll_ms).await;
        }

        let cards = browser.find_all(selectors::CARD).await?;
        let mut listings = Vec::new();

        for (idx, card) in cards
            .iter()
            .take(self.config.max_results_per_query)
            .enumerate()
        {
            match extract_card(browser, card).await {
                Ok(Some(listing)) => listings.push(listing),
                Ok(None) => tracing::debug!(query = %query, card = idx, "Skipping incomplete card"),
                Err(e) => tracing::warn!(query = %query, card = idx, "Error extracting card: {}", e),
            }
        }

        Ok(listings)
    }
}

/// Build a listing from one card, or `None` if a mandatory field is missing.
///
/// Title, company, location and link are mandatory. Posted date and salary
/// fall back to their defaults when absent or unreadable.
pub async fn extract_card<B>(browser: &B, card: &B::Element) -> Result<Option<ListingRecord>>
where
    B: BrowserActions + ?Sized,
{
    let (Some(title), Some(company), Some(location), Some(link)) = (
        browser.find_within(card, selectors::TITLE).await?,
        browser.find_within(card, selectors::COMPANY).await?,
        browser.find_within(card, selectors::LOCATION).await?,
        browser.find_within(card, selectors::LINK).await?,
    ) else {
        return Ok(None);
    };

    let Some(href) = browser.attribute(&link, "href").await? else {
        return Ok(None);
    };

    let mut listing = ListingRecord::new(
        browser.inner_text(&title).await?.trim(),
        browser.inner_text(&company).await?.trim(),
        browser.inner_text(&location).await?.trim(),
        &href,
    );

    if let Some(posted) = optional_attribute(browser, card, selectors::POSTED, "datetime").await {
        listing = listing.with_posted_date(posted);
    }
    if let Some(salary) = optional_text(browser, card, selectors::SALARY).await {
        listing = listing.with_salary(salary);
    }

    Ok(Some(listing))
}

async fn optional_attribute<B>(
    browser: &B,
    card: &B::Element,
    selector: &str,
    name: &str,
) -> Option<String>
where
    B: BrowserActions + ?Sized,
{
    let element = browser.find_within(card, selector).await.ok()??;
    browser
        .attribute(&element, name)
        .await
        .ok()
        .flatten()
        .filter(|v| !v.trim().is_empty())
}

async fn optional_text<B>(browser: &B, card: &B::Element, selector: &str) -> Option<String>
where
    B: BrowserActions + ?Sized,
{
    let element = browser.find_within(card, selector).await.ok()??;
    let text = browser.inner_text(&element).await.ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
