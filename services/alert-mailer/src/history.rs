//! Shared delivery history and running totals

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::alert::Priority;

/// How a single delivery attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Skipped,
    Failed,
}

/// Record of one delivery attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    pub alert_id: String,
    pub ticker: String,
    pub priority: Priority,
    pub recipient: String,
    pub status: DeliveryStatus,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Running counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryTotals {
    pub sent: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Bounded log of delivery attempts
#[derive(Debug)]
pub struct DeliveryLog {
    pub records: VecDeque<DeliveryRecord>,
    pub max_size: usize,
    pub totals: DeliveryTotals,
    pub started_at: Instant,
}

impl DeliveryLog {
    pub fn new(max_size: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(max_size),
            max_size,
            totals: DeliveryTotals::default(),
            started_at: Instant::now(),
        }
    }

    /// Append a record, evicting the oldest once full
    pub fn record(&mut self, record: DeliveryRecord) {
        match record.status {
            DeliveryStatus::Sent => self.totals.sent += 1,
            DeliveryStatus::Skipped => self.totals.skipped += 1,
            DeliveryStatus::Failed => self.totals.failed += 1,
        }

        if self.max_size == 0 {
            return;
        }
        if self.records.len() >= self.max_size {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }
}

/// Thread-safe delivery log handle
pub type LogHandle = Arc<RwLock<DeliveryLog>>;

pub fn new_log_handle(max_size: usize) -> LogHandle {
    Arc::new(RwLock::new(DeliveryLog::new(max_size)))
}
