use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Browser actions for automation.
///
/// Implemented by the chromiumoxide [`BrowserEngine`](crate::BrowserEngine)
/// and by the scripted fake used in tests. Every call may fail with a
/// timeout or a driver error; `find*` calls return `None`/empty when
/// nothing matches instead of failing.
#[async_trait::async_trait]
pub trait BrowserActions: Send + Sync {
    /// Handle to an element on the current page
    type Element: Send + Sync;

    /// Navigate to a URL, failing if the load doesn't finish within `timeout`
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// URL of the current page
    async fn current_url(&self) -> Result<String>;

    /// First element matching a CSS selector
    async fn find(&self, selector: &str) -> Result<Option<Self::Element>>;

    /// All elements matching a CSS selector, in document order
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// First descendant of `parent` matching a CSS selector
    async fn find_within(
        &self,
        parent: &Self::Element,
        selector: &str,
    ) -> Result<Option<Self::Element>>;

    /// First element matching `selector` whose visible text contains `text`
    /// (case-insensitive)
    async fn find_by_text(&self, selector: &str, text: &str) -> Result<Option<Self::Element>>;

    /// Wait until an element matching `selector` exists
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<Self::Element>;

    /// Click an element
    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Replace the value of an input with `value`
    async fn fill(&self, element: &Self::Element, value: &str) -> Result<()>;

    /// Current value of an input
    async fn input_value(&self, element: &Self::Element) -> Result<String>;

    /// Visible text of an element
    async fn inner_text(&self, element: &Self::Element) -> Result<String>;

    /// Attribute value, if the attribute is set
    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    /// Attach files to a file input
    async fn set_input_files(&self, element: &Self::Element, files: &[PathBuf]) -> Result<()>;

    /// Scroll the page by a pixel offset
    async fn scroll_by(&self, dx: i64, dy: i64) -> Result<()>;

    /// Capture the page to a PNG file
    async fn screenshot(&self, path: &Path) -> Result<()>;

    /// Cookies visible to the current page
    async fn cookies(&self) -> Result<Vec<StoredCookie>>;

    /// Install cookies into the browser
    async fn set_cookies(&self, cookies: &[StoredCookie]) -> Result<()>;
}

/// A browser cookie in a driver-independent shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
    /// Expiry as seconds since the Unix epoch; `None` for session cookies
    #[serde(default)]
    pub expires: Option<f64>,
}

fn default_path() -> String {
    "/".to_string()
}

/// One strategy for locating a logical control.
///
/// Controls that the site renders in several shapes are described as an
/// ordered list of matchers; the first one that finds something wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// A CSS selector
    Css(&'static str),
    /// Elements matching `selector` whose text contains `text`
    Text {
        selector: &'static str,
        text: &'static str,
    },
}

impl Matcher {
    /// Run this matcher against the current page.
    pub async fn find<B>(&self, browser: &B) -> Result<Option<B::Element>>
    where
        B: BrowserActions + ?Sized,
    {
        match *self {
            Self::Css(selector) => browser.find(selector).await,
            Self::Text { selector, text } => browser.find_by_text(selector, text).await,
        }
    }
}

/// Return the element found by the first matcher that finds one.
pub async fn first_match<B>(browser: &B, matchers: &[Matcher]) -> Result<Option<B::Element>>
where
    B: BrowserActions + ?Sized,
{
    for matcher in matchers {
        if let Some(element) = matcher.find(browser).await? {
            tracing::trace!("Matched {:?}", matcher);
            return Ok(Some(element));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_defaults() {
        let cookie: StoredCookie =
            serde_json::from_str(r#"{"name":"li_at","value":"abc","domain":".linkedin.com"}"#)
                .expect("parse minimal cookie");
        assert_eq!(cookie.path, "/");
        assert!(!cookie.secure);
        assert!(cookie.expires.is_none());
    }
}
