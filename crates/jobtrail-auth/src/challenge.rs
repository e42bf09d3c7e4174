//! Human hand-off when the site demands verification.
//!
//! The login flow suspends on [`ChallengeResolver::await_resolution`] with no
//! timeout; only the resolver decides when the flow resumes.

use crate::error::{AuthError, Result};
use async_trait::async_trait;
use std::io::{BufRead, Write};
use tokio::sync::{mpsc, Mutex};

/// Source of the "verification done" signal.
#[async_trait]
pub trait ChallengeResolver: Send + Sync {
    /// Block until a human reports the challenge at `url` as handled.
    ///
    /// An `Err` abandons the login attempt.
    async fn await_resolution(&self, url: &str) -> Result<()>;
}

/// Prompts on the terminal and waits for Enter.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleResolver;

#[async_trait]
impl ChallengeResolver for ConsoleResolver {
    async fn await_resolution(&self, url: &str) -> Result<()> {
        tracing::warn!(url, "Security verification required");
        let url = url.to_string();
        tokio::task::spawn_blocking(move || {
            let mut stdout = std::io::stdout();
            let _ = writeln!(
                stdout,
                "\nThe site is asking for verification at {url}.\n\
                 Complete the check in the browser window (or enter the emailed code),\n\
                 then press Enter to continue..."
            );
            let _ = stdout.flush();

            let mut line = String::new();
            match std::io::stdin().lock().read_line(&mut line) {
                Ok(0) => Err(AuthError::ChallengeAbandoned("stdin closed".to_string())),
                Ok(_) => Ok(()),
                Err(e) => Err(AuthError::ChallengeAbandoned(e.to_string())),
            }
        })
        .await
        .map_err(|e| AuthError::ChallengeAbandoned(e.to_string()))?
    }
}

/// Resolves when a message arrives on a channel.
///
/// Used by embedders that surface the challenge elsewhere, and by tests.
#[derive(Debug)]
pub struct ChannelResolver {
    signals: Mutex<mpsc::Receiver<()>>,
}

impl ChannelResolver {
    /// A resolver plus the sender that releases it.
    #[must_use]
    pub fn new() -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel(1);
        (
            Self {
                signals: Mutex::new(rx),
            },
            tx,
        )
    }
}

#[async_trait]
impl ChallengeResolver for ChannelResolver {
    async fn await_resolution(&self, url: &str) -> Result<()> {
        tracing::info!(url, "Waiting for challenge acknowledgement");
        self.signals
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| AuthError::ChallengeAbandoned("signal channel closed".to_string()))
    }
}
