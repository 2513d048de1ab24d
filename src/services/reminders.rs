//! src/services/reminders.rs
//!
//! Reminder scheduling over the bottle collection. Every reschedule is
//! total: the pending set is cleared and recomputed from current bottle
//! state, so repeated runs converge on the same result and there is no
//! incremental diffing to get wrong.
//!
//! Delivery is behind the [`NotificationSink`] trait; the in-process
//! implementation keeps the pending set in memory, standing in for a
//! platform notification service.

use crate::models::{bottle::Bottle, settings::NotificationSettings};
use crate::services::collection;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Low-stock reminders have no meaningful calendar trigger; they fire
/// almost immediately after scheduling.
const LOW_STOCK_DELAY_SECS: i64 = 5;

/// Day thresholds a bottle can be reminded about after opening.
pub const AGE_THRESHOLDS: [i64; 3] = [30, 60, 90];

/// What a reminder is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ReminderKind {
    LowStock,
    Age { days: i64 },
}

/// A reminder handed to the delivery service.
///
/// The identifier is `bottle/{id}/low_stock` or `bottle/{id}/age_{days}`,
/// so a single prefix cancellation drops everything for one bottle.
#[derive(Debug, Clone, Serialize)]
pub struct Reminder {
    pub id: String,
    pub bottle_id: Uuid,
    #[serde(flatten)]
    pub kind: ReminderKind,
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

/// Contract of the notification delivery collaborator: accept reminders
/// with an identifier and an absolute trigger time, bulk cancel, and
/// cancel by identifier prefix.
pub trait NotificationSink: Send + Sync {
    fn schedule(&self, reminder: Reminder);
    fn cancel_all(&self);
    fn cancel_prefixed(&self, prefix: &str);
    fn pending(&self) -> Vec<Reminder>;
}

/// Process-local pending set.
#[derive(Default)]
pub struct InMemorySink {
    pending: Mutex<Vec<Reminder>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NotificationSink for InMemorySink {
    fn schedule(&self, reminder: Reminder) {
        self.pending.lock().expect("reminder lock").push(reminder);
    }

    fn cancel_all(&self) {
        self.pending.lock().expect("reminder lock").clear();
    }

    fn cancel_prefixed(&self, prefix: &str) {
        self.pending
            .lock()
            .expect("reminder lock")
            .retain(|r| !r.id.starts_with(prefix));
    }

    fn pending(&self) -> Vec<Reminder> {
        self.pending.lock().expect("reminder lock").clone()
    }
}

/// ReminderScheduler recomputes the pending reminder set from bottle
/// state. It is the one fire-and-forget piece of the system: callers
/// spawn a reschedule after a ledger mutation and move on.
#[derive(Clone)]
pub struct ReminderScheduler {
    db: Arc<SqlitePool>,
    sink: Arc<dyn NotificationSink>,
}

impl ReminderScheduler {
    pub fn new(db: Arc<SqlitePool>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { db, sink }
    }

    /// Clear the pending set and reschedule from the given snapshot.
    ///
    /// With notifications disabled this still clears, then schedules
    /// nothing.
    pub fn reschedule_all(
        &self,
        bottles: &[Bottle],
        settings: &NotificationSettings,
        now: DateTime<Utc>,
    ) {
        self.sink.cancel_all();
        if !settings.enabled {
            return;
        }
        let mut scheduled = 0usize;
        for bottle in bottles {
            for reminder in reminders_for_bottle(bottle, settings, now) {
                self.sink.schedule(reminder);
                scheduled += 1;
            }
        }
        tracing::debug!(scheduled, total_bottles = bottles.len(), "rescheduled reminders");
    }

    /// Load current settings and bottles from the store and reschedule.
    pub async fn reschedule_from_store(&self) -> Result<(), sqlx::Error> {
        let settings = collection::fetch_settings(&self.db).await?;
        let bottles = collection::fetch_all_bottles(&self.db).await?;
        self.reschedule_all(&bottles, &settings, Utc::now());
        Ok(())
    }

    /// Fire-and-forget reschedule after a mutation. Failures are logged,
    /// never propagated to the initiating request.
    pub fn spawn_reschedule(&self) {
        let scheduler = self.clone();
        tokio::spawn(async move {
            if let Err(err) = scheduler.reschedule_from_store().await {
                tracing::warn!("reminder reschedule failed: {}", err);
            }
        });
    }

    /// Drop every pending reminder for one bottle.
    pub fn cancel_for_bottle(&self, bottle_id: Uuid) {
        self.sink.cancel_prefixed(&format!("bottle/{}/", bottle_id));
    }

    /// Snapshot of the pending set.
    pub fn pending(&self) -> Vec<Reminder> {
        self.sink.pending()
    }
}

/// Compute the reminders one bottle qualifies for right now.
///
/// - Low stock: opened and `0 < remaining% <= threshold`, one reminder.
/// - Age: one reminder per enabled threshold whose date is still in the
///   future; thresholds already passed are skipped, never backfilled.
pub fn reminders_for_bottle(
    bottle: &Bottle,
    settings: &NotificationSettings,
    now: DateTime<Utc>,
) -> Vec<Reminder> {
    let mut reminders = Vec::new();

    let pct = bottle.remaining_percentage();
    if bottle.is_opened() && pct > 0.0 && pct <= settings.low_stock_threshold {
        reminders.push(Reminder {
            id: format!("bottle/{}/low_stock", bottle.id),
            bottle_id: bottle.id,
            kind: ReminderKind::LowStock,
            fire_at: now + Duration::seconds(LOW_STOCK_DELAY_SECS),
            title: "Running low".to_string(),
            body: format!("{} is down to {}% remaining.", bottle.name, pct as i64),
        });
    }

    if let Some(opened) = bottle.opened_date {
        for days in settings.enabled_age_thresholds() {
            let fire_at = opened + Duration::days(days);
            if fire_at <= now {
                continue;
            }
            reminders.push(Reminder {
                id: format!("bottle/{}/age_{}", bottle.id, days),
                bottle_id: bottle.id,
                kind: ReminderKind::Age { days },
                fire_at,
                title: format!("{} days since opening", days),
                body: format!("{} was opened {} days ago.", bottle.name, days),
            });
        }
    }

    reminders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::memory_pool;
    use chrono::Utc;

    fn settings_all_on() -> NotificationSettings {
        NotificationSettings {
            enabled: true,
            low_stock_threshold: 10.0,
            notify_at_30_days: true,
            notify_at_60_days: true,
            notify_at_90_days: true,
        }
    }

    fn bottle(remaining: i64, opened_days_ago: Option<i64>) -> Bottle {
        let now = Utc::now();
        Bottle {
            id: Uuid::new_v4(),
            name: "Talisker 10".into(),
            distillery: "Talisker".into(),
            region: None,
            bottle_type: "Single Malt".into(),
            abv: 45.8,
            volume_ml: 700,
            remaining_volume_ml: remaining,
            purchase_date: None,
            purchase_price: None,
            opened_date: opened_days_ago.map(|d| now - Duration::days(d)),
            rating: 0,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn low_stock_fires_only_in_range() {
        let now = Utc::now();
        let settings = settings_all_on();

        // 5% remaining, opened: qualifies.
        let low = bottle(35, Some(1));
        let reminders = reminders_for_bottle(&low, &settings, now);
        assert!(reminders.iter().any(|r| r.kind == ReminderKind::LowStock));

        // Empty bottle: no low-stock reminder.
        let empty = bottle(0, Some(1));
        let reminders = reminders_for_bottle(&empty, &settings, now);
        assert!(!reminders.iter().any(|r| r.kind == ReminderKind::LowStock));

        // Unopened: nothing at all.
        let unopened = bottle(35, None);
        assert!(reminders_for_bottle(&unopened, &settings, now).is_empty());
    }

    #[test]
    fn age_reminder_scheduled_only_for_future_thresholds() {
        let now = Utc::now();
        let mut settings = settings_all_on();
        settings.notify_at_60_days = false;
        settings.notify_at_90_days = false;

        // Opened 25 days ago: the 30-day mark is 5 days out.
        let b = bottle(700, Some(25));
        let reminders = reminders_for_bottle(&b, &settings, now);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].kind, ReminderKind::Age { days: 30 });
        let lead = reminders[0].fire_at - now;
        assert_eq!(lead.num_days(), 5);

        // Opened 35 days ago: 30 days already passed, no backfill.
        let b = bottle(700, Some(35));
        assert!(reminders_for_bottle(&b, &settings, now).is_empty());
    }

    #[test]
    fn one_age_reminder_per_enabled_threshold() {
        let now = Utc::now();
        let settings = settings_all_on();

        let b = bottle(700, Some(10));
        let reminders = reminders_for_bottle(&b, &settings, now);
        let days: Vec<_> = reminders
            .iter()
            .filter_map(|r| match r.kind {
                ReminderKind::Age { days } => Some(days),
                _ => None,
            })
            .collect();
        assert_eq!(days, vec![30, 60, 90]);
    }

    #[tokio::test]
    async fn reschedule_is_idempotent_and_total() {
        let db = memory_pool().await;
        let sink = Arc::new(InMemorySink::new());
        let scheduler = ReminderScheduler::new(db, sink.clone());
        let settings = settings_all_on();
        let bottles = vec![bottle(35, Some(1)), bottle(700, Some(10))];

        scheduler.reschedule_all(&bottles, &settings, Utc::now());
        let first = scheduler.pending().len();
        scheduler.reschedule_all(&bottles, &settings, Utc::now());
        assert_eq!(scheduler.pending().len(), first);

        // Disabling clears everything.
        let mut off = settings.clone();
        off.enabled = false;
        scheduler.reschedule_all(&bottles, &off, Utc::now());
        assert!(scheduler.pending().is_empty());
    }

    #[tokio::test]
    async fn cancel_for_bottle_drops_only_that_bottle() {
        let db = memory_pool().await;
        let sink = Arc::new(InMemorySink::new());
        let scheduler = ReminderScheduler::new(db, sink);
        let settings = settings_all_on();
        let keep = bottle(700, Some(10));
        let drop_me = bottle(35, Some(10));

        scheduler.reschedule_all(
            &[keep.clone(), drop_me.clone()],
            &settings,
            Utc::now(),
        );
        scheduler.cancel_for_bottle(drop_me.id);

        let pending = scheduler.pending();
        assert!(!pending.is_empty());
        assert!(pending.iter().all(|r| r.bottle_id == keep.id));
    }
}
