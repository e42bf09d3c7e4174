use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("bad address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP error: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, MailError>;
