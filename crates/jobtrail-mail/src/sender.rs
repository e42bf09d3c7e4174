use crate::error::{MailError, Result};
use crate::templates::{EmailTemplate, Notification};
use async_trait::async_trait;
use jobtrail_core::NotificationConfig;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use sha2::{Digest, Sha256};

/// Delivers a built message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn deliver(&self, message: Message) -> Result<()>;
}

/// STARTTLS SMTP relay via lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(host: &str, port: u16, username: &str, password: &str) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .map_err(|e| MailError::Transport(format!("SMTP relay error: {e}")))?
            .port(port)
            .credentials(Credentials::new(username.to_string(), password.to_string()))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn deliver(&self, message: Message) -> Result<()> {
        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport(format!("SMTP send failed: {e}")))?;
        Ok(())
    }
}

/// Sends notifications to the user's own mailbox.
///
/// Built disabled when the SMTP settings are incomplete; a disabled
/// notifier only logs what it would have sent.
pub struct Notifier {
    channel: Option<(Mailbox, Box<dyn MailTransport>)>,
}

impl Notifier {
    /// A notifier that never sends.
    #[must_use]
    pub fn disabled() -> Self {
        Self { channel: None }
    }

    pub fn from_config(config: &NotificationConfig) -> Self {
        let (true, Some(email), Some(password)) = (
            config.is_configured(),
            config.email.as_deref(),
            config.password.as_ref(),
        ) else {
            tracing::warn!("Email notifications disabled (credentials not configured)");
            return Self::disabled();
        };

        let mailer = match SmtpMailer::new(&config.smtp_server, config.smtp_port, email, password) {
            Ok(mailer) => mailer,
            Err(e) => {
                tracing::warn!("Email notifications disabled: {}", e);
                return Self::disabled();
            }
        };

        Self::with_transport(email, Box::new(mailer)).unwrap_or_else(|e| {
            tracing::warn!("Email notifications disabled: {}", e);
            Self::disabled()
        })
    }

    /// Send through `transport` to and from `mailbox`.
    pub fn with_transport(mailbox: &str, transport: Box<dyn MailTransport>) -> Result<Self> {
        let mailbox: Mailbox = mailbox
            .parse()
            .map_err(|e| MailError::Address(format!("{mailbox}: {e}")))?;
        Ok(Self {
            channel: Some((mailbox, transport)),
        })
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.channel.is_some()
    }

    /// Send a notification, returning whether it went out.
    pub async fn notify(&self, notification: &Notification) -> bool {
        let email = notification.render();
        let Some((mailbox, transport)) = &self.channel else {
            tracing::info!("[Email disabled] Would send: {}", email.subject);
            return false;
        };

        match send(&email, mailbox, transport.as_ref()).await {
            Ok(()) => {
                tracing::info!(
                    kind = ?notification.kind(),
                    body_sha256 = %body_hash(&email.body),
                    "Email sent: {}",
                    email.subject
                );
                true
            }
            Err(e) => {
                tracing::error!(kind = ?notification.kind(), "Failed to send email: {}", e);
                false
            }
        }
    }
}

async fn send(email: &EmailTemplate, mailbox: &Mailbox, transport: &dyn MailTransport) -> Result<()> {
    let message = Message::builder()
        .from(mailbox.clone())
        .to(mailbox.clone())
        .subject(&email.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(email.body.clone())
        .map_err(|e| MailError::Build(e.to_string()))?;

    transport.deliver(message).await
}

/// SHA-256 hex of a message body. Bodies are logged by hash only.
#[must_use]
pub fn body_hash(body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}
