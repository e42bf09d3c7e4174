//! Shared domain values used across the Jobtrail crates.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder stored for optional listing fields the site didn't provide.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Normalize a listing URL to its identity form by dropping the query string
/// and fragment.
///
/// Unparseable input is truncated at the first `?` or `#` instead of being
/// rejected, so a scraped relative link still yields a stable key.
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    match url::Url::parse(raw) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => raw
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}

/// A single search to run: one keyword in one location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Job title or free-text keyword
    pub keyword: String,
    /// Location filter as typed into the site's search box
    pub location: String,
}

impl SearchQuery {
    /// Create a query for one keyword/location pair.
    #[must_use]
    pub fn new(keyword: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            location: location.into(),
        }
    }

    /// Every keyword paired with every location, keyword-major.
    #[must_use]
    pub fn cross_product(keywords: &[String], locations: &[String]) -> Vec<Self> {
        keywords
            .iter()
            .flat_map(|keyword| {
                locations
                    .iter()
                    .map(move |location| Self::new(keyword.clone(), location.clone()))
            })
            .collect()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}", self.keyword, self.location)
    }
}

/// A job listing discovered by the collector.
///
/// Identity is the normalized URL. Records are immutable once built; the
/// `with_*` methods consume and return a new value during construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    title: String,
    company: String,
    location: String,
    url: String,
    salary: String,
    posted_date: String,
    discovered_date: NaiveDate,
}

impl ListingRecord {
    /// Build a listing from its four mandatory fields.
    ///
    /// The URL is normalized, salary defaults to [`NOT_SPECIFIED`] and the
    /// posted date defaults to today.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        url: &str,
    ) -> Self {
        let today = Local::now().date_naive();
        Self {
            title: title.into(),
            company: company.into(),
            location: location.into(),
            url: normalize_url(url),
            salary: NOT_SPECIFIED.to_string(),
            posted_date: today.format("%Y-%m-%d").to_string(),
            discovered_date: today,
        }
    }

    /// Set the salary text.
    #[must_use]
    pub fn with_salary(mut self, salary: impl Into<String>) -> Self {
        self.salary = salary.into();
        self
    }

    /// Set the posted date as reported by the site.
    #[must_use]
    pub fn with_posted_date(mut self, posted: impl Into<String>) -> Self {
        self.posted_date = posted.into();
        self
    }

    /// Override the discovery date.
    #[must_use]
    pub fn with_discovered_date(mut self, date: NaiveDate) -> Self {
        self.discovered_date = date;
        self
    }

    /// Job title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Hiring company name.
    #[must_use]
    pub fn company(&self) -> &str {
        &self.company
    }

    /// Job location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Normalized listing URL (the dedup key).
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Salary text, or [`NOT_SPECIFIED`].
    #[must_use]
    pub fn salary(&self) -> &str {
        &self.salary
    }

    /// Posted date as reported by the site.
    #[must_use]
    pub fn posted_date(&self) -> &str {
        &self.posted_date
    }

    /// Date the collector found this listing.
    #[must_use]
    pub fn discovered_date(&self) -> NaiveDate {
        self.discovered_date
    }
}

/// Lifecycle status of a tracked application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    /// Scraped and saved, nothing submitted yet
    Discovered,
    /// Application submitted
    Applied,
    /// The site needs a human to finish the application
    ManualReviewNeeded,
    /// The form flow ended without a submit control
    ApplicationIncomplete,
    /// The automated attempt failed
    ApplicationError,
    /// An interview is on the calendar
    InterviewScheduled,
    /// Rejected by the employer
    Rejected,
    /// Offer received
    Offer,
    /// Offer accepted
    Accepted,
    /// Offer declined
    Declined,
}

impl ApplicationStatus {
    /// Statuses a user may set by hand through the tracker.
    pub const TRACKER_STATUSES: [Self; 6] = [
        Self::Applied,
        Self::InterviewScheduled,
        Self::Rejected,
        Self::Offer,
        Self::Accepted,
        Self::Declined,
    ];

    /// Stored string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Discovered => "Discovered",
            Self::Applied => "Applied",
            Self::ManualReviewNeeded => "Manual Review Needed",
            Self::ApplicationIncomplete => "Application Incomplete",
            Self::ApplicationError => "Application Error",
            Self::InterviewScheduled => "Interview Scheduled",
            Self::Rejected => "Rejected",
            Self::Offer => "Offer",
            Self::Accepted => "Accepted",
            Self::Declined => "Declined",
        }
    }

    /// Parse the stored string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        [
            Self::Discovered,
            Self::Applied,
            Self::ManualReviewNeeded,
            Self::ApplicationIncomplete,
            Self::ApplicationError,
            Self::InterviewScheduled,
            Self::Rejected,
            Self::Offer,
            Self::Accepted,
            Self::Declined,
        ]
        .into_iter()
        .find(|status| status.as_str() == s)
    }

    /// Whether a user may set this status manually.
    #[must_use]
    pub fn is_tracker_status(self) -> bool {
        Self::TRACKER_STATUSES.contains(&self)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_strips_query() {
        assert_eq!(
            normalize_url("https://www.linkedin.com/jobs/view/123?refId=abc&trk=xyz"),
            "https://www.linkedin.com/jobs/view/123"
        );
        assert_eq!(normalize_url("https://x/job/1#apply"), "https://x/job/1");
        assert_eq!(normalize_url("/jobs/view/9?x=1"), "/jobs/view/9");
    }

    #[test]
    fn test_cross_product_covers_all_pairs() {
        let keywords = vec!["Engineer".to_string(), "Developer".to_string()];
        let locations = vec!["Remote".to_string(), "Onboard".to_string()];
        let queries = SearchQuery::cross_product(&keywords, &locations);

        assert_eq!(
            queries,
            vec![
                SearchQuery::new("Engineer", "Remote"),
                SearchQuery::new("Engineer", "Onboard"),
                SearchQuery::new("Developer", "Remote"),
                SearchQuery::new("Developer", "Onboard"),
            ]
        );
    }

    #[test]
    fn test_cross_product_empty_side() {
        let keywords = vec!["Engineer".to_string()];
        assert!(SearchQuery::cross_product(&keywords, &[]).is_empty());
    }

    #[test]
    fn test_listing_defaults() {
        let listing = ListingRecord::new("Engineer", "Acme", "Remote", "https://x/job/1?trk=1");
        assert_eq!(listing.url(), "https://x/job/1");
        assert_eq!(listing.salary(), NOT_SPECIFIED);
        assert_eq!(
            listing.posted_date(),
            listing.discovered_date().format("%Y-%m-%d").to_string()
        );

        let listing = listing.with_salary("$100k").with_posted_date("2025-01-02");
        assert_eq!(listing.salary(), "$100k");
        assert_eq!(listing.posted_date(), "2025-01-02");
    }

    #[test]
    fn test_status_roundtrip_strings() {
        assert_eq!(
            ApplicationStatus::parse("Manual Review Needed"),
            Some(ApplicationStatus::ManualReviewNeeded)
        );
        assert_eq!(ApplicationStatus::parse("Ghosted"), None);
        assert_eq!(ApplicationStatus::Offer.to_string(), "Offer");
    }

    #[test]
    fn test_tracker_statuses() {
        assert!(ApplicationStatus::Rejected.is_tracker_status());
        assert!(!ApplicationStatus::ApplicationError.is_tracker_status());
        assert!(!ApplicationStatus::Discovered.is_tracker_status());
    }
}
