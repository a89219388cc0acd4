use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use super::settings::SmtpSettings;

#[derive(Debug, Error)]
pub(crate) enum MailError {
    #[error("invalid mailbox '{0}'")]
    Address(String),

    #[error("failed to build message")]
    Build(#[source] lettre::error::Error),

    #[error("smtp transport failed")]
    Transport(#[source] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone)]
pub(crate) struct OutgoingEmail {
    pub(crate) to_name: String,
    pub(crate) to_email: String,
    pub(crate) subject: String,
    pub(crate) html_body: String,
}

#[async_trait]
pub(crate) trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError>;
}

pub(crate) struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub(crate) fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(MailError::Transport)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();
        let from = settings
            .from
            .parse::<Mailbox>()
            .map_err(|_| MailError::Address(settings.from.clone()))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        let address = email
            .to_email
            .parse::<Address>()
            .map_err(|_| MailError::Address(email.to_email.clone()))?;
        let to = Mailbox::new(Some(email.to_name), address);

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject)
            .header(ContentType::TEXT_HTML)
            .body(email.html_body)
            .map_err(MailError::Build)?;

        self.transport
            .send(message)
            .await
            .map_err(MailError::Transport)?;
        Ok(())
    }
}

/// Used when no SMTP relay is configured. Never logs the message body,
/// it carries single-purpose tokens.
pub(crate) struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailError> {
        info!(
            to = %email.to_email,
            subject = %email.subject,
            "smtp is not configured, email not delivered"
        );
        Ok(())
    }
}
