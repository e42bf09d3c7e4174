//! Jobtrail Core - Foundation crate for the Jobtrail job-search automation.
//!
//! This crate provides shared types, error handling and configuration
//! management that all other Jobtrail crates depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths and env overrides
//! - [`types`] - Shared domain values (`ListingRecord`, `SearchQuery`, `ApplicationStatus`)
//!
//! # Example
//!
//! ```rust
//! use jobtrail_core::{AppConfig, SearchQuery};
//!
//! let config = AppConfig::default();
//! let queries = SearchQuery::cross_product(&config.search.keywords, &config.search.locations);
//! assert_eq!(
//!     queries.len(),
//!     config.search.keywords.len() * config.search.locations.len()
//! );
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{
    AppConfig, ApplicationConfig, AuthConfig, BrowserConfig, Credentials, NotificationConfig,
    PacingConfig, PathsConfig, ProfileConfig, RetryPolicy, SearchConfig,
};
pub use error::{ConfigError, ConfigResult, CoreError, Result};
pub use types::{normalize_url, ApplicationStatus, ListingRecord, SearchQuery, NOT_SPECIFIED};
