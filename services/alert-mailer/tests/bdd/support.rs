//! In-memory mail transport used by the scenarios

use std::sync::{Arc, Mutex};

use alert_mailer::settings::SmtpConfig;
use alert_mailer::transport::{MailTransport, OutgoingMail, TransportFactory};
use alert_mailer::MailerError;

/// Every message accepted by any transport opened from the same factory
#[derive(Debug, Default)]
pub struct Outbox {
    mails: Mutex<Vec<OutgoingMail>>,
}

impl Outbox {
    pub fn mails(&self) -> Vec<OutgoingMail> {
        self.mails.lock().expect("outbox poisoned").clone()
    }
}

#[derive(Debug)]
struct RecordingTransport {
    outbox: Arc<Outbox>,
    reachable: bool,
}

#[async_trait::async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: &OutgoingMail) -> alert_mailer::Result<()> {
        if !self.reachable {
            return Err(MailerError::Transport("connection refused".to_string()));
        }
        self.outbox
            .mails
            .lock()
            .expect("outbox poisoned")
            .push(mail.clone());
        Ok(())
    }

    async fn verify(&self) -> alert_mailer::Result<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(MailerError::Transport("connection refused".to_string()))
        }
    }
}

/// Opens recording transports that share one outbox
#[derive(Debug)]
pub struct RecordingFactory {
    pub outbox: Arc<Outbox>,
    pub reachable: bool,
}

impl TransportFactory for RecordingFactory {
    fn open(&self, _smtp: &SmtpConfig) -> alert_mailer::Result<Arc<dyn MailTransport>> {
        Ok(Arc::new(RecordingTransport {
            outbox: Arc::clone(&self.outbox),
            reachable: self.reachable,
        }))
    }
}
