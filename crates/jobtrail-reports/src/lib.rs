//! Jobtrail Reports - HTML and CSV summaries of tracked applications.
//!
//! The daily report covers the current day; the weekly report covers the
//! last seven days and also exports its rows as CSV.
//!
//! # Example
//!
//! ```rust,ignore
//! use jobtrail_reports::ReportRenderer;
//!
//! let renderer = ReportRenderer::new(db.clone(), config.paths.reports_path()?);
//! let path = renderer.render_daily(today).await?;
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod csv_export;
pub mod error;
pub mod html;
pub mod renderer;

pub use csv_export::to_csv;
pub use error::{ReportError, Result};
pub use renderer::ReportRenderer;
