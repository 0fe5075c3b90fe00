use std::fmt;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::config::MailConfig;

/// An HTML message addressed to a single recipient.
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub to_address: String,
    pub to_name: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Sends mail on behalf of the application.
#[async_trait]
pub trait Mailer: Send + Sync + fmt::Debug {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// Delivers mail through an SMTP relay using STARTTLS and credentials.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    host: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();
        let sender = Mailbox::new(Some(config.sender_name.clone()), config.username.parse()?);

        Ok(Self {
            transport,
            sender,
            host: config.host.clone(),
        })
    }
}

impl fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("host", &self.host)
            .field("sender", &self.sender.to_string())
            .finish()
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    #[instrument(skip(self, mail), fields(to = %mail.to_address, subject = %mail.subject))]
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let recipient = Mailbox::new(Some(mail.to_name), mail.to_address.parse()?);
        let message = Message::builder()
            .from(self.sender.clone())
            .to(recipient)
            .subject(mail.subject)
            .header(ContentType::TEXT_HTML)
            .body(mail.html_body)?;

        debug!("Sending message through {}", self.host);
        self.transport.send(message).await?;
        info!("Mail delivered to relay");
        Ok(())
    }
}

/// Writes outgoing mail to the log instead of delivering it.
#[derive(Debug, Clone)]
pub struct LogMailer {
    sender_name: String,
}

impl LogMailer {
    pub fn new(sender_name: impl Into<String>) -> Self {
        Self {
            sender_name: sender_name.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        info!(
            from = %self.sender_name,
            to = %mail.to_address,
            subject = %mail.subject,
            "Outgoing mail (not delivered)"
        );
        debug!(body = %mail.html_body, "Outgoing mail body");
        Ok(())
    }
}
