//! Errors the commands report to the user.

use jobtrail_core::ApplicationStatus;
use thiserror::Error;

/// A command refused to run or could not find what it was pointed at.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Site credentials are required for browser commands
    #[error("Credentials not found. Set JOBTRAIL_EMAIL and JOBTRAIL_PASSWORD in your .env file")]
    MissingCredentials,

    #[error("Invalid status: {0}. Valid statuses: {valid}", valid = valid_statuses())]
    InvalidStatus(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("No tracked application with URL {0}")]
    UnknownApplication(String),
}

impl CommandError {
    /// Process exit code for this error: 1 for missing credentials, 2 for
    /// bad input such as an unknown status, date or URL.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingCredentials => 1,
            _ => 2,
        }
    }
}

fn valid_statuses() -> String {
    ApplicationStatus::TRACKER_STATUSES
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
