//! Delivery settings: master switch, per-tier gates and SMTP credentials

use serde::{Deserialize, Serialize};

use crate::alert::Priority;

/// SMTP login
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpAuth {
    pub user: String,
    pub pass: String,
}

impl std::fmt::Debug for SmtpAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpAuth")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Where and how to open the mail transport session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    /// Implicit TLS when true, STARTTLS when the server offers it otherwise
    pub secure: bool,
    pub auth: SmtpAuth,
}

/// Notification settings, replaced wholesale on update.
///
/// The three tier flags are independent gates despite the "only" naming:
/// each one allows delivery for its own tier. All three must be set to
/// deliver every priority, and all false means nothing is ever sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub enabled: bool,
    /// Destination mailbox
    pub email: String,
    pub high_priority_only: bool,
    pub medium_priority_only: bool,
    pub low_priority_only: bool,
    pub smtp_config: SmtpConfig,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            email: default_recipient(),
            high_priority_only: true,
            medium_priority_only: false,
            low_priority_only: false,
            smtp_config: SmtpConfig {
                host: default_smtp_host(),
                port: DEFAULT_SMTP_PORT,
                secure: false,
                auth: SmtpAuth {
                    user: "your-email@gmail.com".to_string(),
                    pass: "your-app-password".to_string(),
                },
            },
        }
    }
}

impl NotificationSettings {
    /// Whether the tier gate for `priority` is open
    pub fn allows(&self, priority: Priority) -> bool {
        match priority {
            Priority::High => self.high_priority_only,
            Priority::Medium => self.medium_priority_only,
            Priority::Low => self.low_priority_only,
        }
    }

    /// Overlay environment-style variables onto these settings.
    ///
    /// Only variables that are present are applied. Flags are enabled by the
    /// literal value `"true"`; an unparsable `SMTP_PORT` is ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("EMAIL_ENABLED") {
            self.enabled = v == "true";
        }
        if let Some(v) = lookup("EMAIL_RECIPIENT") {
            self.email = v;
        }
        if let Some(v) = lookup("SMTP_HOST") {
            self.smtp_config.host = v;
        }
        if let Some(port) = lookup("SMTP_PORT").and_then(|p| p.parse().ok()) {
            self.smtp_config.port = port;
        }
        if let Some(v) = lookup("SMTP_SECURE") {
            self.smtp_config.secure = v == "true";
        }
        if let Some(v) = lookup("SMTP_USER") {
            self.smtp_config.auth.user = v;
        }
        if let Some(v) = lookup("SMTP_PASS") {
            self.smtp_config.auth.pass = v;
        }
    }
}

const DEFAULT_SMTP_PORT: u16 = 587;

fn default_recipient() -> String {
    "your-email@example.com".to_string()
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}
