//! Jobtrail Scanner - job search collection.
//!
//! This crate runs the configured keyword × location searches against the
//! job site and turns the results pages into [`ListingRecord`]s. It
//! coordinates the browser, the login flow and the collector, retrying the
//! whole run on transient failures.
//!
//! # Features
//!
//! - Sequential searches with politeness pacing between queries
//! - Lenient card extraction: incomplete cards are skipped, not fatal
//! - URL dedup and company blacklist filtering
//! - Whole-run retry with exponential backoff
//!
//! # Example
//!
//! ```rust,ignore
//! use jobtrail_auth::{ConsoleResolver, SessionStore};
//! use jobtrail_scanner::{ChromeFactory, ScrapePipeline};
//!
//! let pipeline = ScrapePipeline::new(
//!     &config,
//!     ChromeFactory::new(config.browser.clone()),
//!     ConsoleResolver,
//!     SessionStore::new(config.paths.session_path()?),
//! );
//! let listings = pipeline.run().await?;
//! ```
//!
//! [`ListingRecord`]: jobtrail_core::ListingRecord

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod collector;
#[allow(missing_docs)]
pub mod error;
#[allow(missing_docs)]
pub mod filter;
#[allow(missing_docs)]
pub mod pipeline;
#[allow(missing_docs)]
pub mod retry;
#[allow(missing_docs)]
pub mod url_builder;

// Re-export commonly used types
pub use collector::{extract_card, Collector};
pub use error::{Result, ScanError};
pub use filter::ListingFilter;
pub use pipeline::{ChromeFactory, DriverFactory, ScrapePipeline};
pub use retry::{retry_with_backoff, Retryable};
pub use url_builder::build_search_url;
