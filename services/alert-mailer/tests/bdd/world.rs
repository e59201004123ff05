//! BDD test world for the alert mailer

use std::sync::Arc;
use std::time::Duration;

use alert_mailer::alert::{AlertNotification, Priority};
use alert_mailer::dispatcher::{BulkOutcome, NotificationDispatcher};
use alert_mailer::history::new_log_handle;
use alert_mailer::settings::NotificationSettings;
use alert_mailer::template::RenderedMessage;
use axum::Router;
use chrono::{TimeZone, Utc};
use cucumber::World;

use crate::support::{Outbox, RecordingFactory};

#[derive(Debug, Default, World)]
pub struct MailerWorld {
    // Dispatcher under test
    pub settings: Option<NotificationSettings>,
    pub reachable: Option<bool>,
    pub outbox: Arc<Outbox>,
    pub dispatcher: Option<NotificationDispatcher>,

    // Inputs and results
    pub alert: Option<AlertNotification>,
    pub send_result: Option<bool>,
    pub bulk_result: Option<BulkOutcome>,
    pub bulk_elapsed: Option<Duration>,
    pub connection_result: Option<bool>,
    pub rendered: Vec<RenderedMessage>,

    // HTTP API
    pub router: Option<Router>,
    pub response_status: Option<u16>,
    pub response_body: Option<serde_json::Value>,
}

impl MailerWorld {
    /// Dispatcher built from the given settings and transport on first use
    pub fn dispatcher(&mut self) -> &mut NotificationDispatcher {
        if self.dispatcher.is_none() {
            let settings = self.settings.clone().unwrap_or_default();
            let factory = Arc::new(RecordingFactory {
                outbox: Arc::clone(&self.outbox),
                reachable: self.reachable.unwrap_or(true),
            });
            let dispatcher = NotificationDispatcher::new(settings, factory, new_log_handle(100))
                .expect("failed to build dispatcher");
            self.dispatcher = Some(dispatcher);
        }
        self.dispatcher.as_mut().expect("dispatcher not set")
    }
}

pub fn parse_priority(s: &str) -> Priority {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .unwrap_or_else(|_| panic!("Unknown priority: {}", s))
}

pub fn make_alert(ticker: &str, priority: Priority) -> AlertNotification {
    AlertNotification {
        id: format!("{}-1", ticker),
        ticker: ticker.to_string(),
        priority,
        mention_count: 247,
        volume_ratio: 4.2,
        current_price: 23.45,
        price_change: 12.5,
        detected_at: Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap(),
        sent_at: None,
        email_sent: false,
    }
}

pub fn tier_settings(enabled: bool, high: bool, medium: bool, low: bool) -> NotificationSettings {
    NotificationSettings {
        enabled,
        email: "trader@example.com".to_string(),
        high_priority_only: high,
        medium_priority_only: medium,
        low_priority_only: low,
        ..NotificationSettings::default()
    }
}
