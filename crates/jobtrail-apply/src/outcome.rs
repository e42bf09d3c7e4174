//! Application outcomes.

use chrono::{DateTime, Local};
use jobtrail_core::ApplicationStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a listing needs a human to finish the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManualReason {
    /// The listing has no in-page application flow
    NoEasyApply,
    /// This many required inputs were still empty
    RequiredFields(usize),
}

impl fmt::Display for ManualReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoEasyApply => write!(f, "Job requires manual application"),
            Self::RequiredFields(count) => {
                write!(f, "Application requires manual input for {count} fields")
            }
        }
    }
}

/// Terminal result of one application attempt.
///
/// Every attempt produces exactly one of these. Only `Applied` means the
/// form went through; the others are reported, not retried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApplicationOutcome {
    /// The submit control was clicked
    Applied {
        /// When the submission happened
        timestamp: DateTime<Local>,
        /// Screenshot taken after submission
        evidence: Option<PathBuf>,
    },

    /// A human has to finish the application
    ManualRequired {
        /// What blocked automation
        reason: ManualReason,
        /// Screenshot of the blocking page
        evidence: Option<PathBuf>,
    },

    /// The form ended without a submit control, or ran out of steps
    Incomplete {
        /// Screenshot of the last step reached
        evidence: Option<PathBuf>,
    },

    /// The attempt failed
    Error {
        /// Human-readable failure description
        message: String,
        /// Screenshot at the time of failure, when capture worked
        evidence: Option<PathBuf>,
    },
}

impl ApplicationOutcome {
    /// Tracker status recorded for this outcome.
    #[must_use]
    pub fn status(&self) -> ApplicationStatus {
        match self {
            Self::Applied { .. } => ApplicationStatus::Applied,
            Self::ManualRequired { .. } => ApplicationStatus::ManualReviewNeeded,
            Self::Incomplete { .. } => ApplicationStatus::ApplicationIncomplete,
            Self::Error { .. } => ApplicationStatus::ApplicationError,
        }
    }

    /// Path of the captured evidence snapshot, if any.
    #[must_use]
    pub fn evidence(&self) -> Option<&Path> {
        match self {
            Self::Applied { evidence, .. }
            | Self::ManualRequired { evidence, .. }
            | Self::Incomplete { evidence }
            | Self::Error { evidence, .. } => evidence.as_deref(),
        }
    }

    /// Note stored alongside the status.
    #[must_use]
    pub fn notes(&self) -> Option<String> {
        match self {
            Self::Applied { .. } => None,
            Self::ManualRequired { reason, .. } => Some(reason.to_string()),
            Self::Incomplete { .. } => Some("Application flow incomplete".to_string()),
            Self::Error { message, .. } => Some(message.clone()),
        }
    }

    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}
