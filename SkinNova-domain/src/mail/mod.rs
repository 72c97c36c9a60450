//! Outgoing email

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

mod smtp;
pub mod templates;

pub use smtp::SmtpMailer;

use crate::config::MailConfig;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mail configuration: {0}")]
    Configuration(String),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("Failed to send email: {0}")]
    Transport(String),
}

/// A rendered HTML email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Delivers emails
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;

    /// Whether messages actually leave the process
    fn is_configured(&self) -> bool;
}

/// Mailer that only logs, used when no transport is configured
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        info!(
            "Mail transport not configured, not sending '{}' to {}",
            message.subject, message.to
        );
        Ok(())
    }

    fn is_configured(&self) -> bool {
        false
    }
}

/// Mailer that keeps every message in memory. It can be switched to fail.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(MailError::Transport("recording mailer set to fail".to_string()));
        }
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).push(message);
        Ok(())
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// SMTP mailer when mail is configured, otherwise a logging mailer
pub fn create_mailer(config: Option<&MailConfig>) -> Result<Arc<dyn Mailer>, MailError> {
    match config {
        Some(config) => Ok(Arc::new(SmtpMailer::new(config)?)),
        None => {
            info!("Email service: disabled (configure GMAIL_USER and GMAIL_APP_PASSWORD or MAIL_HOST to enable)");
            Ok(Arc::new(LogMailer))
        }
    }
}
