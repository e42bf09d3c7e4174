//! Stored browser session with an age-based expiry.

use crate::error::{AuthError, Result};
use chrono::{DateTime, Duration, Utc};
use jobtrail_browser::{BrowserActions, StoredCookie};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Sessions older than this are never trusted to skip login.
pub const SESSION_MAX_AGE_DAYS: i64 = 7;

/// Authentication artifacts captured after a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub cookies: Vec<StoredCookie>,
    pub captured_at: DateTime<Utc>,
}

impl SessionState {
    #[must_use]
    pub fn new(cookies: Vec<StoredCookie>, captured_at: DateTime<Utc>) -> Self {
        Self {
            cookies,
            captured_at,
        }
    }

    /// Read the browser's cookies into a session stamped now.
    pub async fn capture<B>(browser: &B) -> Result<Self>
    where
        B: BrowserActions + ?Sized,
    {
        Ok(Self::new(browser.cookies().await?, Utc::now()))
    }

    /// Whether the session is young enough to reuse at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.captured_at) <= Duration::days(SESSION_MAX_AGE_DAYS)
    }
}

/// Single-slot session persistence backed by a JSON file.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the stored session. Failures are logged, never returned.
    pub fn save(&self, session: &SessionState) {
        match self.try_save(session) {
            Ok(()) => tracing::info!(
                cookies = session.cookies.len(),
                "Session saved to {}",
                self.path.display()
            ),
            Err(e) => tracing::warn!("Failed to save session: {}", e),
        }
    }

    /// Overwrite the stored session, reporting failures.
    ///
    /// Writes to a sibling temp file and renames it over the target so a
    /// crash mid-write leaves the previous session intact.
    pub fn try_save(&self, session: &SessionState) -> Result<()> {
        let io_err = |source| AuthError::SessionIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = serde_json::to_vec_pretty(session)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }

    /// Load the stored session if it exists, parses and is fresh.
    #[must_use]
    pub fn load(&self) -> Option<SessionState> {
        self.load_at(Utc::now())
    }

    /// [`load`](Self::load) with an explicit clock.
    #[must_use]
    pub fn load_at(&self, now: DateTime<Utc>) -> Option<SessionState> {
        let contents = match fs::read(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No stored session at {}", self.path.display());
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to read session {}: {}", self.path.display(), e);
                return None;
            }
        };

        let session: SessionState = match serde_json::from_slice(&contents) {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Ignoring unreadable session file: {}", e);
                return None;
            }
        };

        if !session.is_fresh(now) {
            tracing::info!(
                captured_at = %session.captured_at,
                "Stored session is older than {} days, ignoring",
                SESSION_MAX_AGE_DAYS
            );
            return None;
        }

        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cookie() -> StoredCookie {
        StoredCookie {
            name: "li_at".to_string(),
            value: "token".to_string(),
            domain: ".linkedin.com".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: true,
            expires: None,
        }
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().expect("temp dir");
        let store = SessionStore::new(tmp.path().join("nested").join("session.json"));
        let session = SessionState::new(vec![cookie()], Utc::now());

        store.try_save(&session).expect("save session");
        assert_eq!(store.load(), Some(session));
    }

    #[test]
    fn test_save_overwrites_previous() {
        let tmp = TempDir::new().expect("temp dir");
        let store = SessionStore::new(tmp.path().join("session.json"));

        store.save(&SessionState::new(vec![cookie()], Utc::now()));
        store.save(&SessionState::new(vec![], Utc::now()));

        let loaded = store.load().expect("session present");
        assert!(loaded.cookies.is_empty());
    }

    #[test]
    fn test_missing_file_is_none() {
        let tmp = TempDir::new().expect("temp dir");
        let store = SessionStore::new(tmp.path().join("absent.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn test_corrupt_file_is_none() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("session.json");
        fs::write(&path, b"{not json").expect("write garbage");
        assert!(SessionStore::new(path).load().is_none());
    }

    #[test]
    fn test_freshness_cutoff() {
        let tmp = TempDir::new().expect("temp dir");
        let store = SessionStore::new(tmp.path().join("session.json"));
        let now = Utc::now();

        store
            .try_save(&SessionState::new(vec![cookie()], now - Duration::days(8)))
            .expect("save stale session");
        assert!(store.load_at(now).is_none());

        store
            .try_save(&SessionState::new(vec![cookie()], now - Duration::days(6)))
            .expect("save fresh session");
        assert!(store.load_at(now).is_some());
    }

    #[test]
    fn test_save_failure_is_non_fatal() {
        let tmp = TempDir::new().expect("temp dir");
        // A directory where the file should be makes the rename fail
        let path = tmp.path().join("session.json");
        fs::create_dir_all(path.join("occupied")).expect("create blocker");
        let store = SessionStore::new(&path);

        assert!(store
            .try_save(&SessionState::new(vec![], Utc::now()))
            .is_err());
        store.save(&SessionState::new(vec![], Utc::now()));
    }
}
