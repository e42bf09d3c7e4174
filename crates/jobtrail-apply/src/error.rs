//! Error types for the application subsystem.

use jobtrail_browser::BrowserError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while driving an application form.
///
/// These never escape [`EasyApplier::apply`](crate::EasyApplier::apply);
/// they end up as the message of an `Error` outcome.
#[derive(Error, Debug)]
pub enum ApplyError {
    /// The browser driver failed
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// The evidence directory could not be prepared
    #[error("cannot prepare evidence directory {path}: {source}")]
    EvidenceDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for application operations.
pub type Result<T> = std::result::Result<T, ApplyError>;
