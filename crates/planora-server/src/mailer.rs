//! Outbound email collaborator contract.
//!
//! Delivery transport (SMTP or otherwise) is external to this service; the
//! session flows only need the narrow [`Mailer`] seam defined here. The
//! [`TracingMailer`] backs local runs, the [`RecordingMailer`] backs tests.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

/// Tracing target for outbound email operations.
const TRACING_TARGET: &str = "planora_server::mailer";

/// Result type for mailer operations.
pub type MailerResult<T> = std::result::Result<T, MailerError>;

/// Failures of the email collaborator.
#[derive(Debug, Error)]
pub enum MailerError {
    /// The delivery transport rejected or failed the message.
    #[error("email delivery failed: {0}")]
    Delivery(String),
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    /// Recipient addresses.
    pub to: Vec<String>,
    /// Subject line.
    pub subject: String,
    /// Message body.
    pub body: String,
}

/// Contract for sending email.
///
/// Failures surface immediately to the calling flow; no retries happen at
/// this level.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one message to the given recipients.
    async fn send(&self, email: Email) -> MailerResult<()>;
}

/// Mailer that logs messages instead of delivering them.
///
/// Used by local runs where no SMTP collaborator is wired up.
#[derive(Debug, Default, Clone)]
pub struct TracingMailer;

#[async_trait::async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, email: Email) -> MailerResult<()> {
        tracing::info!(
            target: TRACING_TARGET,
            to = ?email.to,
            subject = %email.subject,
            body_len = email.body.len(),
            "outbound email (not delivered: tracing mailer)"
        );
        Ok(())
    }
}

/// Mailer that records every message for later inspection.
#[derive(Debug, Default, Clone)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl RecordingMailer {
    /// Creates an empty recording mailer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every message sent so far.
    pub async fn sent(&self) -> Vec<Email> {
        self.sent.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> MailerResult<()> {
        self.sent.lock().await.push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email(to: &str) -> Email {
        Email {
            to: vec![to.to_owned()],
            subject: "Confirm email".to_owned(),
            body: "hello".to_owned(),
        }
    }

    #[tokio::test]
    async fn recording_mailer_keeps_messages() -> anyhow::Result<()> {
        let mailer = RecordingMailer::new();
        mailer.send(email("a@x.com")).await?;
        mailer.send(email("b@x.com")).await?;

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, vec!["a@x.com".to_owned()]);
        Ok(())
    }

    #[tokio::test]
    async fn tracing_mailer_always_succeeds() -> anyhow::Result<()> {
        TracingMailer.send(email("a@x.com")).await?;
        Ok(())
    }
}
