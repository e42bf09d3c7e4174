use jobtrail_core::SearchQuery;

/// Search results URL for one keyword/location pair.
///
/// Both parameters are percent-encoded, so spaces become `%20`.
pub fn build_search_url(base_url: &str, query: &SearchQuery) -> String {
    format!(
        "{}/jobs/search/?keywords={}&location={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(&query.keyword),
        urlencoding::encode(&query.location)
    )
}
