//! Jobtrail Apply - Easy-Apply automation for job listings.
//!
//! This crate drives a listing's in-page application form to one of four
//! outcomes and records a screenshot for each of them.
//!
//! # Architecture
//!
//! - **Controls** ([`controls`]): ordered matcher strategies per form control
//! - **Applier** ([`applier`]): the bounded step loop
//! - **Evidence** ([`evidence`]): snapshot naming and capture
//! - **Outcomes** ([`outcome`]): terminal results and their tracker status
//!
//! # Example
//!
//! ```rust,ignore
//! use jobtrail_apply::EasyApplier;
//!
//! let applier = EasyApplier::from_config(&config)?;
//! let outcome = applier.apply(&browser, &listing).await;
//! db.set_status(listing.url(), outcome.status(), outcome.notes().as_deref()).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

#[allow(missing_docs)]
pub mod applier;
#[allow(missing_docs)]
pub mod controls;
pub mod error;
#[allow(missing_docs)]
pub mod evidence;
pub mod outcome;

// Re-export commonly used types
pub use applier::EasyApplier;
pub use error::{ApplyError, Result};
pub use evidence::{evidence_file_name, EvidenceKind, EvidenceRecorder};
pub use outcome::{ApplicationOutcome, ManualReason};
