//! Jobtrail Mail - email notifications.
//!
//! Notifications are rendered from plain-text templates and sent to the
//! configured mailbox over SMTP. Sending never fails the caller: an
//! unconfigured or failing notifier logs and reports `false`.

pub mod error;
pub mod sender;
pub mod templates;

pub use error::{MailError, Result};
pub use sender::{body_hash, MailTransport, Notifier, SmtpMailer};
pub use templates::{render_template, EmailTemplate, Notification, NotificationKind};
