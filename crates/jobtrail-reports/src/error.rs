//! Error types for report rendering.

use jobtrail_db::DatabaseError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Report data could not be loaded
    #[error("report query failed: {0}")]
    Database(#[from] DatabaseError),

    /// The HTML template failed to render
    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    /// The CSV export failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Writing the report file failed
    #[error("cannot write report {path}: {source}")]
    Write {
        /// Target file or directory
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
