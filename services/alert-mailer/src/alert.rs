//! Alert records and priority tiers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority tier of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Lowercase wire name, e.g. "high"
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Uppercase label used in subjects and message bodies
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Priority::High => "\u{1F525}",
            Priority::Medium => "\u{26A1}",
            Priority::Low => "\u{1F4C8}",
        }
    }

    /// Accent colour (red, amber, green)
    pub fn color(&self) -> &'static str {
        match self {
            Priority::High => "#ef4444",
            Priority::Medium => "#f59e0b",
            Priority::Low => "#10b981",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected anomaly that may be emailed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertNotification {
    pub id: String,
    pub ticker: String,
    pub priority: Priority,
    pub mention_count: u64,
    /// Multiple of baseline volume
    pub volume_ratio: f64,
    pub current_price: f64,
    /// Percent
    pub price_change: f64,
    pub detected_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_sent: bool,
}

impl AlertNotification {
    /// Copy of this alert marked as delivered at `at`
    pub fn mark_sent(&self, at: DateTime<Utc>) -> AlertNotification {
        AlertNotification {
            sent_at: Some(at),
            email_sent: true,
            ..self.clone()
        }
    }
}
