//! Browser automation for Jobtrail.
//!
//! [`BrowserActions`] is the driver capability set the login, search and
//! application flows are written against. [`BrowserEngine`] implements it on
//! top of a local Chrome via chromiumoxide; the `fake` feature adds a
//! scripted in-memory implementation for tests.

pub mod actions;
pub mod engine;
pub mod error;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
pub mod fingerprint;
pub mod pacing;

pub use actions::{first_match, BrowserActions, Matcher, StoredCookie};
pub use engine::BrowserEngine;
pub use error::{BrowserError, Result};
pub use pacing::Pacing;
