//! Mail transport abstraction and the lettre SMTP implementation

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::settings::SmtpConfig;
use crate::MailerError;

/// A fully addressed message ready for one transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub sender_name: String,
    pub sender_address: String,
    pub recipient: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Send-one-message contract of a mail session
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait MailTransport: Send + Sync {
    /// Deliver a single message
    async fn send(&self, mail: &OutgoingMail) -> crate::Result<()>;

    /// Check the session is reachable and authenticated without sending
    async fn verify(&self) -> crate::Result<()>;
}

/// Opens a transport session for a given SMTP configuration
#[cfg_attr(test, mockall::automock)]
pub trait TransportFactory: Send + Sync {
    fn open(&self, smtp: &SmtpConfig) -> crate::Result<Arc<dyn MailTransport>>;
}

/// Production transport backed by lettre's async SMTP client
pub struct SmtpMailTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl std::fmt::Debug for SmtpMailTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailTransport")
            .field("host", &self.host)
            .finish()
    }
}

impl SmtpMailTransport {
    /// Build a session for `smtp`. No connection is made until first use.
    pub fn new(smtp: &SmtpConfig) -> crate::Result<Self> {
        let tls_parameters = TlsParameters::new(smtp.host.clone()).map_err(|e| {
            MailerError::Transport(format!("TLS configuration for {}: {}", smtp.host, e))
        })?;

        let tls = if smtp.secure {
            Tls::Wrapper(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
            .port(smtp.port)
            .tls(tls);

        if !smtp.auth.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                smtp.auth.user.clone(),
                smtp.auth.pass.clone(),
            ));
        }

        tracing::debug!(
            "Created SMTP transport for {}:{} (secure={})",
            smtp.host,
            smtp.port,
            smtp.secure
        );

        Ok(Self {
            inner: builder.build(),
            host: smtp.host.clone(),
        })
    }
}

/// Assemble a multipart/alternative message from `mail`
pub fn build_message(mail: &OutgoingMail) -> crate::Result<Message> {
    let sender: Address = mail.sender_address.parse().map_err(|e| {
        MailerError::Address(format!("sender '{}': {}", mail.sender_address, e))
    })?;
    let recipient: Address = mail
        .recipient
        .parse()
        .map_err(|e| MailerError::Address(format!("recipient '{}': {}", mail.recipient, e)))?;

    Message::builder()
        .from(Mailbox::new(Some(mail.sender_name.clone()), sender))
        .to(Mailbox::new(None, recipient))
        .subject(mail.subject.clone())
        .multipart(MultiPart::alternative_plain_html(
            mail.text.clone(),
            mail.html.clone(),
        ))
        .map_err(|e| MailerError::Transport(format!("Building message: {}", e)))
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> crate::Result<()> {
        let message = build_message(mail)?;
        tracing::debug!("SMTP send to {} via {}", mail.recipient, self.host);

        let response = self
            .inner
            .send(message)
            .await
            .map_err(|e| MailerError::Transport(format!("SMTP send via {} failed: {}", self.host, e)))?;

        tracing::debug!(
            "SMTP {} accepted message: {}",
            self.host,
            response.code()
        );
        Ok(())
    }

    async fn verify(&self) -> crate::Result<()> {
        let ok = self.inner.test_connection().await.map_err(|e| {
            MailerError::Transport(format!("SMTP verify of {} failed: {}", self.host, e))
        })?;

        if !ok {
            return Err(MailerError::Transport(format!(
                "SMTP server {} did not accept the connection",
                self.host
            )));
        }
        Ok(())
    }
}

/// Opens a fresh [`SmtpMailTransport`] per settings value
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpTransportFactory;

impl TransportFactory for SmtpTransportFactory {
    fn open(&self, smtp: &SmtpConfig) -> crate::Result<Arc<dyn MailTransport>> {
        Ok(Arc::new(SmtpMailTransport::new(smtp)?))
    }
}
