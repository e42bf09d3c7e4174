use jobtrail_core::ListingRecord;
use std::collections::HashSet;

/// Dedup and blacklist policy applied to a run's combined results.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Lowercased, non-empty blacklist substrings
    blacklist: Vec<String>,
}

impl ListingFilter {
    pub fn new<S: AsRef<str>>(blacklist: &[S]) -> Self {
        Self {
            blacklist: blacklist
                .iter()
                .map(|s| s.as_ref().trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Whether `company` contains any blacklisted substring, ignoring case.
    pub fn is_blacklisted(&self, company: &str) -> bool {
        let company = company.to_lowercase();
        self.blacklist.iter().any(|entry| company.contains(entry))
    }

    /// Keep the first listing per URL, then drop blacklisted companies.
    ///
    /// Surviving listings keep their relative order.
    pub fn apply(&self, listings: Vec<ListingRecord>) -> Vec<ListingRecord> {
        let mut seen = HashSet::new();
        let mut filtered = Vec::with_capacity(listings.len());

        for listing in listings {
            if !seen.insert(listing.url().to_string()) {
                tracing::debug!(url = listing.url(), "Skipping duplicate listing");
                continue;
            }
            if self.is_blacklisted(listing.company()) {
                tracing::info!(
                    company = listing.company(),
                    url = listing.url(),
                    "Skipping blacklisted company"
                );
                continue;
            }
            filtered.push(listing);
        }

        filtered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: u32, company: &str) -> ListingRecord {
        ListingRecord::new("Engineer", company, "Remote", &format!("https://x/job/{id}"))
    }

    fn urls(listings: &[ListingRecord]) -> Vec<&str> {
        listings.iter().map(ListingRecord::url).collect()
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let filter = ListingFilter::default();
        let out = filter.apply(vec![
            listing(1, "First"),
            listing(2, "Other"),
            listing(1, "Second"),
        ]);
        assert_eq!(urls(&out), vec!["https://x/job/1", "https://x/job/2"]);
        assert_eq!(out[0].company(), "First");
    }

    #[test]
    fn test_dedup_uses_normalized_url() {
        let filter = ListingFilter::default();
        let a = ListingRecord::new("E", "A", "R", "https://x/job/1?trk=a");
        let b = ListingRecord::new("E", "A", "R", "https://x/job/1?trk=b");
        assert_eq!(filter.apply(vec![a, b]).len(), 1);
    }

    #[test]
    fn test_dedup_idempotent() {
        let filter = ListingFilter::new(&["Spam"]);
        let once = filter.apply(vec![listing(1, "A"), listing(1, "A"), listing(2, "SpamCo")]);
        let twice = filter.apply(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_blacklist_case_insensitive_substring() {
        let filter = ListingFilter::new(&["BadCompany Inc", "staffing"]);
        let out = filter.apply(vec![
            listing(1, "badcompany inc."),
            listing(2, "Good Corp"),
            listing(3, "Acme Staffing Partners"),
            listing(4, "Fine Ltd"),
        ]);
        assert_eq!(urls(&out), vec!["https://x/job/2", "https://x/job/4"]);
    }

    #[test]
    fn test_blank_blacklist_entries_ignored() {
        let filter = ListingFilter::new(&["", "   "]);
        assert!(!filter.is_blacklisted("Anything"));
        assert_eq!(filter.apply(vec![listing(1, "Anything")]).len(), 1);
    }
}
