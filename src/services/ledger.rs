//! src/services/ledger.rs
//!
//! LedgerService — consumption bookkeeping against the bottle collection.
//! Every mutation pairs a drinking-log insert with the bottle update inside
//! one SQLite transaction, so a failed save rolls back both and never
//! leaves the log and the bottle disagreeing about how much was poured.

use crate::models::{bottle::Bottle, drinking_log::DrinkingLog};
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Fixed size of the one-tap pour shortcut, in milliliters.
pub const STANDARD_POUR_ML: i64 = 30;

/// Canned note attached to a remaining-volume decrease.
pub const REMAINING_UPDATE_NOTE: &str = "Remaining volume update";

/// Canned note attached to a standard pour.
pub const STANDARD_POUR_NOTE: &str = "Standard pour";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("bottle `{0}` not found")]
    BottleNotFound(Uuid),
    #[error("save failed: {0}")]
    SaveFailed(#[from] sqlx::Error),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// LedgerService provides the consumption operations:
/// - Record a pour (creates a log, decrements remaining volume)
/// - Set remaining volume directly (logs the implied consumption, if any)
/// - Record a standard 30 ml pour
///
/// It owns no state beyond the connection pool; bottle truth lives in the
/// store, and callers re-read it from the returned record.
#[derive(Clone)]
pub struct LedgerService {
    db: Arc<SqlitePool>,
}

impl LedgerService {
    /// Create a new LedgerService backed by the provided SQLite pool.
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Record a consumption event.
    ///
    /// Sets the opened date on first consumption, inserts one drinking log
    /// for `volume_ml`, and decrements the remaining volume clamped at
    /// zero. Negative inputs are clamped to zero rather than rejected.
    pub async fn record_consumption(
        &self,
        bottle_id: Uuid,
        volume_ml: i64,
        note: Option<String>,
    ) -> LedgerResult<Bottle> {
        let volume_ml = volume_ml.max(0);
        let mut tx = self.db.begin().await?;
        let mut bottle = fetch_bottle(&mut tx, bottle_id).await?;

        let now = Utc::now();
        if bottle.opened_date.is_none() {
            bottle.opened_date = Some(now);
        }

        insert_log(
            &mut tx,
            bottle_id,
            volume_ml,
            note.or_else(|| Some(REMAINING_UPDATE_NOTE.to_string())),
        )
        .await?;

        bottle.remaining_volume_ml = (bottle.remaining_volume_ml - volume_ml).max(0);
        bottle.updated_at = now;
        store_bottle_state(&mut tx, &bottle).await?;

        tx.commit().await?;
        Ok(bottle)
    }

    /// Set the remaining volume directly.
    ///
    /// Models "user dragged the slider down" as an implicit consumption:
    /// when the new value is lower than the old one, exactly one log is
    /// created for the difference. Increases (corrections) create no log.
    /// The stored value is clamped into `[0, volume_ml]` regardless of the
    /// input's sign or magnitude.
    pub async fn set_remaining_volume(
        &self,
        bottle_id: Uuid,
        new_remaining_ml: i64,
    ) -> LedgerResult<Bottle> {
        let mut tx = self.db.begin().await?;
        let mut bottle = fetch_bottle(&mut tx, bottle_id).await?;

        let now = Utc::now();
        let consumed = bottle.remaining_volume_ml - new_remaining_ml;
        if consumed > 0 {
            insert_log(
                &mut tx,
                bottle_id,
                consumed,
                Some(REMAINING_UPDATE_NOTE.to_string()),
            )
            .await?;
            if bottle.opened_date.is_none() {
                bottle.opened_date = Some(now);
            }
        }

        bottle.remaining_volume_ml = new_remaining_ml.clamp(0, bottle.volume_ml);
        bottle.updated_at = now;
        store_bottle_state(&mut tx, &bottle).await?;

        tx.commit().await?;
        Ok(bottle)
    }

    /// Record a standard 30 ml pour with its canned note.
    pub async fn consume_standard_pour(&self, bottle_id: Uuid) -> LedgerResult<Bottle> {
        self.record_consumption(
            bottle_id,
            STANDARD_POUR_ML,
            Some(STANDARD_POUR_NOTE.to_string()),
        )
        .await
    }

    /// All logs for one bottle, newest first.
    pub async fn logs_for_bottle(&self, bottle_id: Uuid) -> LedgerResult<Vec<DrinkingLog>> {
        let logs = sqlx::query_as::<_, DrinkingLog>(
            "SELECT id, bottle_id, volume_ml, date, notes, created_at
             FROM drinking_logs WHERE bottle_id = ? ORDER BY date DESC",
        )
        .bind(bottle_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(logs)
    }
}

async fn fetch_bottle(tx: &mut Transaction<'_, Sqlite>, id: Uuid) -> LedgerResult<Bottle> {
    sqlx::query_as::<_, Bottle>(
        "SELECT id, name, distillery, region, bottle_type, abv, volume_ml,
                remaining_volume_ml, purchase_date, purchase_price, opened_date,
                rating, notes, created_at, updated_at
         FROM bottles WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(LedgerError::BottleNotFound(id))
}

async fn insert_log(
    tx: &mut Transaction<'_, Sqlite>,
    bottle_id: Uuid,
    volume_ml: i64,
    notes: Option<String>,
) -> LedgerResult<()> {
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO drinking_logs (id, bottle_id, volume_ml, date, notes, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4())
    .bind(bottle_id)
    .bind(volume_ml)
    .bind(now)
    .bind(notes)
    .bind(now)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn store_bottle_state(
    tx: &mut Transaction<'_, Sqlite>,
    bottle: &Bottle,
) -> LedgerResult<()> {
    sqlx::query(
        "UPDATE bottles SET remaining_volume_ml = ?, opened_date = ?, updated_at = ?
         WHERE id = ?",
    )
    .bind(bottle.remaining_volume_ml)
    .bind(bottle.opened_date)
    .bind(bottle.updated_at)
    .bind(bottle.id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{memory_pool, seed_bottle};

    #[tokio::test]
    async fn record_consumption_reduces_volume_and_opens_bottle() {
        let db = memory_pool().await;
        let bottle = seed_bottle(&db, 700, 700).await;
        let ledger = LedgerService::new(db);

        let updated = ledger
            .record_consumption(bottle.id, 100, None)
            .await
            .unwrap();

        assert_eq!(updated.remaining_volume_ml, 600);
        assert!(updated.is_opened());
    }

    #[tokio::test]
    async fn record_consumption_clamps_at_zero() {
        let db = memory_pool().await;
        let bottle = seed_bottle(&db, 700, 10).await;
        let ledger = LedgerService::new(db);

        let updated = ledger.record_consumption(bottle.id, 30, None).await.unwrap();

        assert_eq!(updated.remaining_volume_ml, 0);
    }

    #[tokio::test]
    async fn standard_pour_creates_one_30ml_log() {
        let db = memory_pool().await;
        let bottle = seed_bottle(&db, 700, 700).await;
        let ledger = LedgerService::new(db);

        let updated = ledger.consume_standard_pour(bottle.id).await.unwrap();

        assert_eq!(updated.remaining_volume_ml, 700 - STANDARD_POUR_ML);
        assert!(updated.is_opened());

        let logs = ledger.logs_for_bottle(bottle.id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].volume_ml, STANDARD_POUR_ML);
        assert_eq!(logs[0].notes.as_deref(), Some(STANDARD_POUR_NOTE));
    }

    #[tokio::test]
    async fn set_remaining_volume_logs_only_decreases() {
        let db = memory_pool().await;
        let bottle = seed_bottle(&db, 700, 700).await;
        let ledger = LedgerService::new(db);

        let updated = ledger.set_remaining_volume(bottle.id, 650).await.unwrap();
        assert_eq!(updated.remaining_volume_ml, 650);
        assert!(updated.is_opened());

        let logs = ledger.logs_for_bottle(bottle.id).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].volume_ml, 50);
    }

    #[tokio::test]
    async fn set_remaining_volume_increase_creates_no_log() {
        let db = memory_pool().await;
        let bottle = seed_bottle(&db, 700, 500).await;
        let ledger = LedgerService::new(db);

        let updated = ledger.set_remaining_volume(bottle.id, 600).await.unwrap();
        assert_eq!(updated.remaining_volume_ml, 600);
        assert!(!updated.is_opened());

        let logs = ledger.logs_for_bottle(bottle.id).await.unwrap();
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn set_remaining_volume_clamps_to_zero() {
        let db = memory_pool().await;
        let bottle = seed_bottle(&db, 700, 100).await;
        let ledger = LedgerService::new(db);

        let updated = ledger.set_remaining_volume(bottle.id, -50).await.unwrap();
        assert_eq!(updated.remaining_volume_ml, 0);
    }

    #[tokio::test]
    async fn set_remaining_volume_clamps_to_total() {
        let db = memory_pool().await;
        let bottle = seed_bottle(&db, 700, 500).await;
        let ledger = LedgerService::new(db);

        let updated = ledger.set_remaining_volume(bottle.id, 1000).await.unwrap();
        assert_eq!(updated.remaining_volume_ml, 700);
    }

    #[tokio::test]
    async fn unknown_bottle_is_reported() {
        let db = memory_pool().await;
        let ledger = LedgerService::new(db);

        let err = ledger
            .record_consumption(Uuid::new_v4(), 30, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::BottleNotFound(_)));
    }
}
