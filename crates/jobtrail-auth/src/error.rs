use jobtrail_browser::BrowserError;
use std::path::PathBuf;
use thiserror::Error;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// The browser driver failed
    #[error("browser error: {0}")]
    Browser(#[from] BrowserError),

    /// A login form control was missing
    #[error("login form control not found: {0}")]
    MissingControl(&'static str),

    /// Reading or writing the stored session failed
    #[error("session file {path}: {source}")]
    SessionIo {
        /// Session file path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The stored session could not be (de)serialized
    #[error("session serialization failed: {0}")]
    SessionFormat(#[from] serde_json::Error),

    /// The human verification hand-off was abandoned
    #[error("challenge was not acknowledged: {0}")]
    ChallengeAbandoned(String),
}

/// Result type for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;
