//! User-configurable notification settings, stored as a single DB row.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Settings driving the reminder scheduler.
///
/// Kept as one row so an update and the subsequent reschedule always see
/// a consistent set of toggles.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct NotificationSettings {
    /// Master switch; when off, rescheduling clears pending reminders and
    /// schedules nothing.
    pub enabled: bool,

    /// Low-stock threshold as a remaining percentage. Default 10.0.
    pub low_stock_threshold: f64,

    /// Toggle for the 30-days-since-opened reminder.
    pub notify_at_30_days: bool,

    /// Toggle for the 60-days-since-opened reminder.
    pub notify_at_60_days: bool,

    /// Toggle for the 90-days-since-opened reminder.
    pub notify_at_90_days: bool,
}

impl NotificationSettings {
    /// The age thresholds (in days) currently enabled, ascending.
    pub fn enabled_age_thresholds(&self) -> Vec<i64> {
        let mut thresholds = Vec::new();
        if self.notify_at_30_days {
            thresholds.push(30);
        }
        if self.notify_at_60_days {
            thresholds.push(60);
        }
        if self.notify_at_90_days {
            thresholds.push(90);
        }
        thresholds
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            low_stock_threshold: 10.0,
            notify_at_30_days: false,
            notify_at_60_days: false,
            notify_at_90_days: false,
        }
    }
}
