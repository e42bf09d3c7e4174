//! Jobtrail Authentication Layer
//!
//! Logs the browser into the job site and keeps the resulting session on
//! disk so later runs can skip the credential form.
//!
//! # Flow
//!
//! 1. **Session check**: a fresh stored session is installed and probed for
//!    the authenticated marker (short timeout)
//! 2. **Credential entry**: email and password typed with human pacing
//! 3. **Classification**: on timeout the URL decides between challenge,
//!    already-logged-in and failure
//! 4. **Challenge**: suspends on a [`ChallengeResolver`] until a human is
//!    done, then waits once more with an extended timeout
//!
//! # Session Management
//!
//! - Sessions older than [`SESSION_MAX_AGE_DAYS`] are never reused
//! - Saving is best-effort; a failed save only logs

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod challenge;
pub mod error;
pub mod login;
pub mod session;

pub use challenge::{ChallengeResolver, ChannelResolver, ConsoleResolver};
pub use error::{AuthError, Result};
pub use login::{classify_url, LoginFlow, LoginOutcome, UrlClass};
pub use session::{SessionState, SessionStore, SESSION_MAX_AGE_DAYS};
