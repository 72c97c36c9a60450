use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{error, info};

use super::{EmailMessage, MailError, Mailer};
use crate::config::MailConfig;

/// SMTP delivery through lettre
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    host: String,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("host", &self.host)
            .field("from", &self.from.to_string())
            .finish()
    }
}

impl SmtpMailer {
    /// Port 465 uses implicit TLS, any other port STARTTLS
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| MailError::Configuration(format!("Invalid SMTP host: {}", e)))?;

        let mut builder = builder
            .port(config.port)
            .timeout(Some(Duration::from_secs(10)));

        if !config.username.is_empty() {
            builder = builder.credentials(Credentials::new(config.username.clone(), config.password.clone()));
        }

        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(format!("{}: {}", config.from, e)))?;

        info!("Email service: SMTP via {}:{}", config.host, config.port);

        Ok(Self {
            transport: builder.build(),
            from,
            host: config.host.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let to = message
            .to
            .parse::<Mailbox>()
            .map_err(|e| MailError::Address(format!("{}: {}", message.to, e)))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .header(ContentType::TEXT_HTML)
            .body(message.html_body)
            .map_err(|e| MailError::Message(e.to_string()))?;

        match self.transport.send(email).await {
            Ok(response) => {
                info!("Email '{}' sent to {}: {:?}", message.subject, message.to, response.code());
                Ok(())
            }
            Err(e) => {
                error!("Error sending email to {}: {}", message.to, e);
                Err(MailError::Transport(e.to_string()))
            }
        }
    }

    fn is_configured(&self) -> bool {
        true
    }
}
