//! Rent notice email and its delivery.
//!
//! [`Notifier`] builds the message and hands it to a [`MailTransport`].
//! Production delivery goes through [`SmtpMailer`], a STARTTLS submission
//! session authenticated with the configured address and password. Each
//! [`Notifier::notify`] call opens one session and never retries.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use rentnotice_core::{Notice, NotificationConfig, RenterRecord};
use tracing::{debug, info};

use crate::NotifyError;

/// Delivers a fully built message.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), NotifyError>;
}

/// SMTP submission with STARTTLS and password login.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &NotificationConfig) -> Result<Self, NotifyError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp.host)
            .map_err(|source| NotifyError::Setup {
                host: config.smtp.host.clone(),
                source,
            })?
            .port(config.smtp.port)
            .credentials(Credentials::new(
                config.sender.clone(),
                config.password.clone(),
            ))
            .build();
        Ok(Self { transport })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: Message) -> Result<(), NotifyError> {
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Transmission(Box::new(e)))?;
        debug!(code = %response.code(), "SMTP server accepted message");
        Ok(())
    }
}

fn mailbox(address: &str) -> Result<Mailbox, NotifyError> {
    address.parse().map_err(|source| NotifyError::Address {
        address: address.to_string(),
        source,
    })
}

/// Build the rent notice for `record`.
///
/// Addressed to the renter with a copy to the sender.
pub fn build_message(
    config: &NotificationConfig,
    record: &RenterRecord,
    amount: f64,
) -> Result<Message, NotifyError> {
    let notice = Notice::compose(config, amount);
    let sender = mailbox(&config.sender)?;
    let renter = mailbox(&record.email)?;

    let mut builder = Message::builder()
        .from(sender.clone())
        .to(renter.clone())
        .subject(notice.subject)
        .header(ContentType::TEXT_PLAIN);
    if renter.email != sender.email {
        builder = builder.to(sender);
    }
    Ok(builder.body(notice.body)?)
}

/// Sends rent notices through a [`MailTransport`].
#[derive(Clone)]
pub struct Notifier {
    transport: Arc<dyn MailTransport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    /// Notifier backed by an SMTP session to `config.smtp`.
    pub fn smtp(config: &NotificationConfig) -> Result<Self, NotifyError> {
        Ok(Self::new(Arc::new(SmtpMailer::new(config)?)))
    }

    /// Send one notice for `amount` owed by `record`.
    pub async fn notify(
        &self,
        config: &NotificationConfig,
        record: &RenterRecord,
        amount: f64,
    ) -> Result<(), NotifyError> {
        let message = build_message(config, record, amount)?;
        info!(
            renter = %record.email,
            amount = %format!("{amount:.2}"),
            host = %config.smtp.host,
            "sending rent notice"
        );
        self.transport.send(message).await?;
        info!(renter = %record.email, "rent notice sent");
        Ok(())
    }
}
