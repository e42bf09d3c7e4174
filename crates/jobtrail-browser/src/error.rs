use chromiumoxide::error::CdpError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserError>;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("chromium error: {0}")]
    Chromium(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("connection to browser lost: {0}")]
    Connection(String),

    #[error("selector not found: {0}")]
    SelectorNotFound(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrowserError {
    /// Whether a fresh attempt at the whole run could plausibly succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_) | Self::Navigation(_) | Self::Connection(_)
        )
    }
}

impl From<CdpError> for BrowserError {
    fn from(err: CdpError) -> Self {
        match &err {
            CdpError::Timeout => Self::Timeout("CDP request timed out".to_string()),
            CdpError::NoResponse | CdpError::Ws(_) => Self::Connection(err.to_string()),
            _ => Self::Chromium(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BrowserError::Navigation("page not found".to_string());
        assert_eq!(err.to_string(), "navigation failed: page not found");
    }

    #[test]
    fn test_transient_classification() {
        assert!(BrowserError::Timeout("nav".to_string()).is_transient());
        assert!(BrowserError::Navigation("dns".to_string()).is_transient());
        assert!(BrowserError::Connection("ws closed".to_string()).is_transient());
        assert!(!BrowserError::SelectorNotFound("#x".to_string()).is_transient());
        assert!(!BrowserError::Launch("no chrome".to_string()).is_transient());
    }

    #[test]
    fn test_cdp_timeout_is_transient() {
        let err: BrowserError = CdpError::Timeout.into();
        assert!(matches!(err, BrowserError::Timeout(_)));
        assert!(err.is_transient());
    }
}
