//! Configuration management for Jobtrail.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. The loaded [`AppConfig`] is immutable;
//! components receive the section they need at construction.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use zeroize::Zeroizing;

/// Main application configuration.
///
/// This is loaded from `~/.config/jobtrail/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Search criteria
    pub search: SearchConfig,
    /// Application behaviour
    pub application: ApplicationConfig,
    /// Contact details typed into application forms
    pub profile: ProfileConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Politeness delays
    pub pacing: PacingConfig,
    /// Retry policy for the scrape pipeline
    pub retry: RetryPolicy,
    /// Login timeouts
    pub auth: AuthConfig,
    /// Email notification settings
    pub notifications: NotificationConfig,
    /// Storage location overrides
    pub paths: PathsConfig,
    /// Site login credentials (environment only, never serialized)
    #[serde(skip)]
    pub credentials: Option<Credentials>,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `JOBTRAIL_EMAIL` / `JOBTRAIL_PASSWORD`: site login credentials
    /// - `JOBTRAIL_AUTO_APPLY`: enable Easy-Apply submissions (true/false)
    /// - `JOBTRAIL_MAX_APPLICATIONS_PER_DAY`: cap on apply attempts per run
    /// - `JOBTRAIL_HEADLESS`: override browser headless mode (true/false)
    /// - `JOBTRAIL_USER_PHONE` / `JOBTRAIL_USER_CITY`: form contact fields
    /// - `JOBTRAIL_SMTP_PASSWORD`: notification mailbox password
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Unparseable values are ignored and the configured value is kept.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let (Some(email), Some(password)) =
            (lookup("JOBTRAIL_EMAIL"), lookup("JOBTRAIL_PASSWORD"))
        {
            if !email.is_empty() && !password.is_empty() {
                self.credentials = Some(Credentials::new(email, password));
            }
        }

        if let Some(enabled) = lookup("JOBTRAIL_AUTO_APPLY").and_then(|v| v.parse().ok()) {
            self.application.auto_apply = enabled;
            tracing::debug!("Override application.auto_apply from env: {}", enabled);
        }

        if let Some(max) = lookup("JOBTRAIL_MAX_APPLICATIONS_PER_DAY").and_then(|v| v.parse().ok())
        {
            self.application.max_applications_per_day = max;
            tracing::debug!(
                "Override application.max_applications_per_day from env: {}",
                max
            );
        }

        if let Some(headless) = lookup("JOBTRAIL_HEADLESS").and_then(|v| v.parse().ok()) {
            self.browser.headless = headless;
            tracing::debug!("Override browser.headless from env: {}", headless);
        }

        if let Some(phone) = lookup("JOBTRAIL_USER_PHONE") {
            self.profile.phone = phone;
        }

        if let Some(city) = lookup("JOBTRAIL_USER_CITY") {
            self.profile.city = city;
        }

        if let Some(password) = lookup("JOBTRAIL_SMTP_PASSWORD") {
            self.notifications.password = Some(Zeroizing::new(password));
        }
    }

    /// The configured credentials, or the error the CLI reports before exiting.
    pub fn require_credentials(&self) -> ConfigResult<&Credentials> {
        self.credentials
            .as_ref()
            .ok_or(ConfigError::MissingCredentials(
                "JOBTRAIL_EMAIL and JOBTRAIL_PASSWORD",
            ))
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> ConfigResult<()> {
        let config_path = Self::config_path()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ConfigError::InvalidValue {
                field: "config_path".to_string(),
                reason: "no parent directory".to_string(),
            })?;

        fs::create_dir_all(config_dir)?;
        tracing::debug!("Saving config to {}", config_path.display());

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/jobtrail/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "jobtrail", "jobtrail").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/jobtrail`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs =
            ProjectDirs::from("com", "jobtrail", "jobtrail").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

/// Site login credentials. The password is zeroized on drop.
#[derive(Clone)]
pub struct Credentials {
    /// Login email
    pub email: String,
    /// Login password
    pub password: Zeroizing<String>,
}

impl Credentials {
    /// Build a credential pair.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Search criteria.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Keywords, each searched in every location
    pub keywords: Vec<String>,
    /// Locations, each searched for every keyword
    pub locations: Vec<String>,
    /// Company-name substrings to drop (case-insensitive)
    pub blacklist_companies: Vec<String>,
    /// Site origin, e.g. `https://www.linkedin.com`
    pub base_url: String,
    /// Cards extracted per query
    pub max_results_per_query: usize,
    /// Scroll cycles used to surface lazily loaded cards
    pub scroll_cycles: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: vec![
                "Python Developer".to_string(),
                "Software Engineer".to_string(),
                "Fullstack Developer".to_string(),
            ],
            locations: vec![
                "Remote".to_string(),
                "New York".to_string(),
                "San Francisco".to_string(),
            ],
            blacklist_companies: vec![],
            base_url: "https://www.linkedin.com".to_string(),
            max_results_per_query: 15,
            scroll_cycles: 3,
        }
    }
}

/// Application behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Attempt Easy-Apply submissions; otherwise listings are only recorded
    pub auto_apply: bool,
    /// Hard cap on apply attempts in one run
    pub max_applications_per_day: usize,
    /// Days after discovery before a follow-up is due
    pub follow_up_days: u32,
    /// Resume uploaded to file inputs, if present on disk
    pub resume_path: Option<PathBuf>,
    /// Form steps walked before giving up
    pub max_steps: u32,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            auto_apply: false,
            max_applications_per_day: 10,
            follow_up_days: 7,
            resume_path: None,
            max_steps: 10,
        }
    }
}

/// Contact details typed into application forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Phone number
    pub phone: String,
    /// City of residence
    pub city: String,
    /// Personal website
    pub website: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            phone: "123-456-7890".to_string(),
            city: "New York".to_string(),
            website: String::new(),
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Navigation timeout in milliseconds
    pub timeout_ms: u64,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
}

impl BrowserConfig {
    /// Navigation timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_ms: 30_000,
            window_width: 1920,
            window_height: 1080,
        }
    }
}

/// Politeness delays in milliseconds.
///
/// None of these are needed for correctness; they slow the run down to a
/// human pace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Lower bound of the jitter between credential keystrokes
    pub jitter_min_ms: u64,
    /// Upper bound of the jitter between credential keystrokes
    pub jitter_max_ms: u64,
    /// Pause after each scroll cycle
    pub scroll_ms: u64,
    /// Pause between search queries
    pub between_queries_ms: u64,
    /// Pause after a listing page loads
    pub page_settle_ms: u64,
    /// Pause after opening the Easy-Apply dialog
    pub open_form_ms: u64,
    /// Pause after a resume upload
    pub upload_ms: u64,
    /// Pause after clicking a next/review control
    pub next_step_ms: u64,
    /// Pause after clicking submit
    pub submit_ms: u64,
    /// Pause after a successful application
    pub after_applied_ms: u64,
    /// Pause between application attempts
    pub between_applications_ms: u64,
}

impl PacingConfig {
    /// A pacing profile with every delay set to zero.
    #[must_use]
    pub fn none() -> Self {
        Self {
            jitter_min_ms: 0,
            jitter_max_ms: 0,
            scroll_ms: 0,
            between_queries_ms: 0,
            page_settle_ms: 0,
            open_form_ms: 0,
            upload_ms: 0,
            next_step_ms: 0,
            submit_ms: 0,
            after_applied_ms: 0,
            between_applications_ms: 0,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            jitter_min_ms: 500,
            jitter_max_ms: 1500,
            scroll_ms: 1000,
            between_queries_ms: 2000,
            page_settle_ms: 3000,
            open_form_ms: 2000,
            upload_ms: 1000,
            next_step_ms: 2000,
            submit_ms: 3000,
            after_applied_ms: 5000,
            between_applications_ms: 3000,
        }
    }
}

/// Retry policy for the whole login+search pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Lower bound on any backoff wait
    pub min_wait_ms: u64,
    /// Upper bound on any backoff wait
    pub max_wait_ms: u64,
    /// Base of the exponential backoff, in seconds
    pub backoff_base: u32,
}

impl RetryPolicy {
    /// Wait before the retry that follows failed attempt `attempt` (1-based).
    ///
    /// `backoff_base^attempt` seconds, clamped to `[min_wait, max_wait]`.
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp_ms = u64::from(self.backoff_base)
            .checked_pow(attempt)
            .and_then(|secs| secs.checked_mul(1000))
            .unwrap_or(u64::MAX);
        let min = self.min_wait_ms.min(self.max_wait_ms);
        Duration::from_millis(exp_ms.clamp(min, self.max_wait_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            min_wait_ms: 1000,
            max_wait_ms: 10_000,
            backoff_base: 2,
        }
    }
}

/// Login timeouts in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Probe for the authenticated marker when reusing a stored session
    pub session_check_timeout_ms: u64,
    /// Wait for the authenticated marker after submitting credentials
    pub login_timeout_ms: u64,
    /// Wait for the authenticated marker after a human cleared a challenge
    pub challenge_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_check_timeout_ms: 5_000,
            login_timeout_ms: 15_000,
            challenge_timeout_ms: 60_000,
        }
    }
}

/// Email notification settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// SMTP relay host
    pub smtp_server: String,
    /// SMTP port (STARTTLS)
    pub smtp_port: u16,
    /// Sender and recipient mailbox
    pub email: Option<String>,
    /// Mailbox password (environment only)
    #[serde(skip)]
    pub password: Option<Zeroizing<String>>,
}

impl NotificationConfig {
    /// Whether every setting needed to send mail is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.smtp_server.is_empty()
            && self.email.as_deref().is_some_and(|e| !e.is_empty())
            && self.password.as_ref().is_some_and(|p| !p.is_empty())
    }
}

impl fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            email: None,
            password: None,
        }
    }
}

/// Storage location overrides. Unset entries resolve under the data dir.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Root for everything below when set
    pub data_dir: Option<PathBuf>,
    /// SQLite record store
    pub database: Option<PathBuf>,
    /// Evidence screenshots
    pub screenshots_dir: Option<PathBuf>,
    /// Rendered reports
    pub reports_dir: Option<PathBuf>,
    /// Stored browser session
    pub session_file: Option<PathBuf>,
}

impl PathsConfig {
    /// Root directory for generated data.
    pub fn data_root(&self) -> ConfigResult<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => AppConfig::data_dir(),
        }
    }

    /// SQLite record store path.
    pub fn database_path(&self) -> ConfigResult<PathBuf> {
        self.resolve(self.database.as_ref(), "applications.db")
    }

    /// Evidence screenshot directory.
    pub fn screenshots_path(&self) -> ConfigResult<PathBuf> {
        self.resolve(self.screenshots_dir.as_ref(), "screenshots")
    }

    /// Report output directory.
    pub fn reports_path(&self) -> ConfigResult<PathBuf> {
        self.resolve(self.reports_dir.as_ref(), "reports")
    }

    /// Stored session file.
    pub fn session_path(&self) -> ConfigResult<PathBuf> {
        self.resolve(self.session_file.as_ref(), "session.json")
    }

    fn resolve(&self, explicit: Option<&PathBuf>, default_name: &str) -> ConfigResult<PathBuf> {
        match explicit {
            Some(path) => Ok(path.clone()),
            None => Ok(self.data_root()?.join(default_name)),
        }
    }
}
