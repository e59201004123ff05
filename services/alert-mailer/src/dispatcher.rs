//! Notification dispatcher: eligibility policy, rendering and paced delivery

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::alert::AlertNotification;
use crate::history::{DeliveryRecord, DeliveryStatus, LogHandle};
use crate::settings::NotificationSettings;
use crate::template::{self, RenderedMessage};
use crate::transport::{MailTransport, OutgoingMail, TransportFactory};

/// Pause between consecutive attempts of a bulk send
pub const BULK_SEND_PAUSE: Duration = Duration::from_secs(1);

/// Display name on the From header
pub const SENDER_NAME: &str = "Meme Stock Alerts";

/// How `deliver` ended for one alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    /// Not eligible under the current settings
    Skipped,
    /// The transport rejected or could not deliver the message
    Failed(String),
}

impl DeliveryOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, DeliveryOutcome::Sent)
    }
}

/// Tally of a bulk send. Skips and transport failures both count as failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub sent: usize,
    pub failed: usize,
}

/// One element of a bulk request
#[derive(Debug, Clone, PartialEq)]
pub enum BulkEntry {
    Alert(AlertNotification),
    /// Could not be read as an alert; the reason is logged
    Invalid(String),
}

/// Owns the active settings and the transport session built from them
pub struct NotificationDispatcher {
    settings: NotificationSettings,
    transport: Arc<dyn MailTransport>,
    factory: Arc<dyn TransportFactory>,
    log: LogHandle,
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("settings", &self.settings)
            .finish()
    }
}

impl NotificationDispatcher {
    pub fn new(
        settings: NotificationSettings,
        factory: Arc<dyn TransportFactory>,
        log: LogHandle,
    ) -> crate::Result<Self> {
        let transport = factory.open(&settings.smtp_config)?;
        tracing::debug!(
            "Created dispatcher for {} (enabled={})",
            settings.email,
            settings.enabled
        );
        Ok(Self {
            settings,
            transport,
            factory,
            log,
        })
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    pub fn log(&self) -> &LogHandle {
        &self.log
    }

    /// Eligibility: master switch on and the alert's own tier flag set
    pub fn should_deliver(&self, alert: &AlertNotification) -> bool {
        self.settings.enabled && self.settings.allows(alert.priority)
    }

    pub fn render_message(&self, alert: &AlertNotification) -> RenderedMessage {
        template::render_message(alert)
    }

    /// Apply the policy and, when eligible, send through the transport.
    /// Never fails; transport errors come back as [`DeliveryOutcome::Failed`].
    pub async fn deliver(&self, alert: &AlertNotification) -> DeliveryOutcome {
        let outcome = self.attempt(alert).await;

        let (status, error) = match &outcome {
            DeliveryOutcome::Sent => (DeliveryStatus::Sent, None),
            DeliveryOutcome::Skipped => (DeliveryStatus::Skipped, None),
            DeliveryOutcome::Failed(e) => (DeliveryStatus::Failed, Some(e.clone())),
        };
        self.log.write().await.record(DeliveryRecord {
            alert_id: alert.id.clone(),
            ticker: alert.ticker.clone(),
            priority: alert.priority,
            recipient: self.settings.email.clone(),
            status,
            error,
            timestamp: Utc::now(),
        });

        outcome
    }

    async fn attempt(&self, alert: &AlertNotification) -> DeliveryOutcome {
        if !self.settings.enabled {
            tracing::info!("Email notifications disabled, skipped {}", alert.ticker);
            return DeliveryOutcome::Skipped;
        }
        if !self.settings.allows(alert.priority) {
            tracing::info!(
                "Skipped email for {} - priority {} not enabled",
                alert.ticker,
                alert.priority
            );
            return DeliveryOutcome::Skipped;
        }

        let rendered = self.render_message(alert);
        let mail = OutgoingMail {
            sender_name: SENDER_NAME.to_string(),
            sender_address: self.settings.smtp_config.auth.user.clone(),
            recipient: self.settings.email.clone(),
            subject: rendered.subject,
            text: rendered.text,
            html: rendered.html,
        };

        match self.transport.send(&mail).await {
            Ok(()) => {
                tracing::info!("Email sent for {} to {}", alert.ticker, mail.recipient);
                DeliveryOutcome::Sent
            }
            Err(e) => {
                tracing::warn!("Failed to send email for {}: {}", alert.ticker, e);
                DeliveryOutcome::Failed(e.to_string())
            }
        }
    }

    /// True only when the message was handed to the transport successfully
    pub async fn send_alert(&self, alert: &AlertNotification) -> bool {
        self.deliver(alert).await.is_sent()
    }

    /// Send each alert in order, pausing [`BULK_SEND_PAUSE`] between attempts.
    /// Runs to the end of the list; a failure never aborts the batch.
    pub async fn send_bulk_alerts(&self, alerts: &[AlertNotification]) -> BulkOutcome {
        self.send_bulk(alerts.iter().map(Ok)).await
    }

    /// Like [`send_bulk_alerts`](Self::send_bulk_alerts), for batches that may
    /// hold entries which could not be read as alerts. Those count as failed
    /// and still take their place in the pacing.
    pub async fn send_bulk_entries(&self, entries: &[BulkEntry]) -> BulkOutcome {
        self.send_bulk(entries.iter().map(|entry| match entry {
            BulkEntry::Alert(alert) => Ok(alert),
            BulkEntry::Invalid(reason) => Err(reason.as_str()),
        }))
        .await
    }

    async fn send_bulk<'a, I>(&self, entries: I) -> BulkOutcome
    where
        I: Iterator<Item = Result<&'a AlertNotification, &'a str>> + Send,
    {
        let mut outcome = BulkOutcome::default();

        for (i, entry) in entries.enumerate() {
            if i > 0 {
                tokio::time::sleep(BULK_SEND_PAUSE).await;
            }
            let sent = match entry {
                Ok(alert) => self.send_alert(alert).await,
                Err(reason) => {
                    tracing::warn!("Bulk entry {} is not a valid alert: {}", i, reason);
                    false
                }
            };
            if sent {
                outcome.sent += 1;
            } else {
                outcome.failed += 1;
            }
        }

        tracing::info!(
            "Bulk send finished: {} sent, {} failed",
            outcome.sent,
            outcome.failed
        );
        outcome
    }

    /// Verify the transport session without sending anything
    pub async fn test_connection(&self) -> bool {
        match self.transport.verify().await {
            Ok(()) => {
                tracing::info!(
                    "Mail transport {} verified",
                    self.settings.smtp_config.host
                );
                true
            }
            Err(e) => {
                tracing::warn!("Mail transport verification failed: {}", e);
                false
            }
        }
    }

    /// Swap in `settings` and a transport built from scratch for them.
    /// On error the previous settings and session stay active.
    pub fn replace_settings(&mut self, settings: NotificationSettings) -> crate::Result<()> {
        let transport = self.factory.open(&settings.smtp_config)?;
        self.transport = transport;
        self.settings = settings;
        tracing::info!(
            "Notification settings replaced (recipient={}, enabled={})",
            self.settings.email,
            self.settings.enabled
        );
        Ok(())
    }
}
