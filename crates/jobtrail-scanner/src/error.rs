use jobtrail_browser::BrowserError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),
}

impl ScanError {
    /// Timeouts and connectivity failures; everything else fails fast.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Browser(e) => e.is_transient(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
