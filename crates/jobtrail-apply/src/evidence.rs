//! Screenshot evidence for application outcomes.

use crate::error::{ApplyError, Result};
use chrono::{Local, NaiveDateTime};
use jobtrail_browser::BrowserActions;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which moment of an attempt a snapshot documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceKind {
    /// Listing without an in-page application flow
    Manual,
    /// Form blocked on required inputs
    ManualInput,
    /// Page after submission
    Success,
    /// Last step of an unfinished form
    Incomplete,
    /// Page at the time of a failure
    Error,
}

impl EvidenceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::ManualInput => "manual_input",
            Self::Success => "success",
            Self::Incomplete => "incomplete",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for EvidenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{kind}_{company}_{YYYYMMDD_HHMMSS}.png`, with spaces and slashes in the
/// company name replaced by underscores.
#[must_use]
pub fn evidence_file_name(kind: EvidenceKind, company: &str, at: NaiveDateTime) -> String {
    let company: String = company
        .chars()
        .map(|c| if c == ' ' || c == '/' { '_' } else { c })
        .collect();
    format!("{}_{}_{}.png", kind, company, at.format("%Y%m%d_%H%M%S"))
}

/// Writes evidence screenshots into one directory.
#[derive(Debug, Clone)]
pub struct EvidenceRecorder {
    dir: PathBuf,
}

impl EvidenceRecorder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Capture the current page, returning where the snapshot went.
    pub async fn try_capture<B>(&self, browser: &B, kind: EvidenceKind, company: &str) -> Result<PathBuf>
    where
        B: BrowserActions + ?Sized,
    {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ApplyError::EvidenceDir {
                path: self.dir.clone(),
                source,
            })?;

        let path = self
            .dir
            .join(evidence_file_name(kind, company, Local::now().naive_local()));
        browser.screenshot(&path).await?;
        tracing::debug!(path = %path.display(), "Evidence captured");
        Ok(path)
    }

    /// Best-effort capture: failures are logged and yield `None`.
    pub async fn capture<B>(&self, browser: &B, kind: EvidenceKind, company: &str) -> Option<PathBuf>
    where
        B: BrowserActions + ?Sized,
    {
        match self.try_capture(browser, kind, company).await {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(kind = %kind, "Evidence capture failed: {}", e);
                None
            }
        }
    }
}
