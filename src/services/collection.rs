//! src/services/collection.rs
//!
//! CollectionService — CRUD over bottles, the wishlist, and notification
//! settings, backed by SQLite. Consumption bookkeeping lives in the
//! ledger; this service owns everything else the store does: creation,
//! edits, deletion (logs cascade with their bottle), search, the random
//! pick, and the wishlist-to-bottle conversion.

use crate::models::{
    bottle::Bottle, drinking_log::DrinkingLog, settings::NotificationSettings,
    wishlist::WishlistItem,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("bottle `{0}` not found")]
    BottleNotFound(Uuid),
    #[error("wishlist item `{0}` not found")]
    WishlistItemNotFound(Uuid),
    #[error("save failed: {0}")]
    SaveFailed(#[from] sqlx::Error),
}

pub type CollectionResult<T> = Result<T, CollectionError>;

/// Fields accepted when adding a bottle.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBottle {
    pub name: String,
    pub distillery: String,
    pub region: Option<String>,
    pub bottle_type: String,
    pub abv: f64,
    pub volume_ml: i64,
    /// Defaults to a full bottle when omitted.
    pub remaining_volume_ml: Option<i64>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub purchase_price: Option<i64>,
    pub rating: Option<i64>,
    pub notes: Option<String>,
}

/// Metadata edit of an existing bottle.
///
/// Remaining volume is deliberately absent; it only moves through the
/// ledger so that consumption is always logged.
#[derive(Debug, Clone, Deserialize)]
pub struct BottleUpdate {
    pub name: String,
    pub distillery: String,
    pub region: Option<String>,
    pub bottle_type: String,
    pub abv: f64,
    pub volume_ml: i64,
    pub purchase_date: Option<DateTime<Utc>>,
    pub purchase_price: Option<i64>,
    pub rating: Option<i64>,
    pub notes: Option<String>,
}

/// Fields accepted when adding a wishlist item.
#[derive(Debug, Clone, Deserialize)]
pub struct NewWishlistItem {
    pub name: String,
    pub distillery: String,
    pub priority: Option<i64>,
    pub target_price: Option<i64>,
    pub notes: Option<String>,
}

/// Purchase details supplied when converting a wishlist item to a bottle.
#[derive(Debug, Clone, Deserialize)]
pub struct PurchaseDetails {
    pub bottle_type: String,
    pub abv: f64,
    pub volume_ml: i64,
    pub purchase_date: Option<DateTime<Utc>>,
    /// Falls back to the wishlist target price when omitted.
    pub purchase_price: Option<i64>,
}

/// Load the notification settings row; defaults when the row is missing.
pub async fn fetch_settings(db: &SqlitePool) -> Result<NotificationSettings, sqlx::Error> {
    let settings = sqlx::query_as::<_, NotificationSettings>(
        "SELECT enabled, low_stock_threshold, notify_at_30_days, notify_at_60_days,
                notify_at_90_days
         FROM notification_settings WHERE id = 1",
    )
    .fetch_optional(db)
    .await?;
    Ok(settings.unwrap_or_default())
}

/// Load the full bottle collection, newest first.
pub async fn fetch_all_bottles(db: &SqlitePool) -> Result<Vec<Bottle>, sqlx::Error> {
    sqlx::query_as::<_, Bottle>(
        "SELECT id, name, distillery, region, bottle_type, abv, volume_ml,
                remaining_volume_ml, purchase_date, purchase_price, opened_date,
                rating, notes, created_at, updated_at
         FROM bottles ORDER BY created_at DESC",
    )
    .fetch_all(db)
    .await
}

#[derive(Clone)]
pub struct CollectionService {
    db: Arc<SqlitePool>,
}

impl CollectionService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// List bottles, optionally filtered by a case-insensitive search over
    /// name and distillery.
    pub async fn list_bottles(&self, search: Option<&str>) -> CollectionResult<Vec<Bottle>> {
        let mut bottles = fetch_all_bottles(&self.db).await?;
        if let Some(query) = search {
            bottles.retain(|b| b.matches(query));
        }
        Ok(bottles)
    }

    pub async fn get_bottle(&self, id: Uuid) -> CollectionResult<Bottle> {
        sqlx::query_as::<_, Bottle>(
            "SELECT id, name, distillery, region, bottle_type, abv, volume_ml,
                    remaining_volume_ml, purchase_date, purchase_price, opened_date,
                    rating, notes, created_at, updated_at
             FROM bottles WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(CollectionError::BottleNotFound(id))
    }

    /// Add a bottle. Out-of-range numeric input is clamped, not rejected.
    pub async fn create_bottle(&self, new: NewBottle) -> CollectionResult<Bottle> {
        let now = Utc::now();
        let volume_ml = new.volume_ml.max(0);
        let bottle = Bottle {
            id: Uuid::new_v4(),
            name: new.name,
            distillery: new.distillery,
            region: new.region,
            bottle_type: new.bottle_type,
            abv: new.abv.clamp(0.0, 100.0),
            volume_ml,
            remaining_volume_ml: new.remaining_volume_ml.unwrap_or(volume_ml).clamp(0, volume_ml),
            purchase_date: new.purchase_date,
            purchase_price: new.purchase_price,
            opened_date: None,
            rating: new.rating.unwrap_or(0).clamp(0, 5),
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO bottles (id, name, distillery, region, bottle_type, abv,
                                  volume_ml, remaining_volume_ml, purchase_date,
                                  purchase_price, opened_date, rating, notes,
                                  created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(bottle.id)
        .bind(&bottle.name)
        .bind(&bottle.distillery)
        .bind(&bottle.region)
        .bind(&bottle.bottle_type)
        .bind(bottle.abv)
        .bind(bottle.volume_ml)
        .bind(bottle.remaining_volume_ml)
        .bind(bottle.purchase_date)
        .bind(bottle.purchase_price)
        .bind(bottle.opened_date)
        .bind(bottle.rating)
        .bind(&bottle.notes)
        .bind(bottle.created_at)
        .bind(bottle.updated_at)
        .execute(&*self.db)
        .await?;

        Ok(bottle)
    }

    /// Edit bottle metadata. If the total volume shrinks below the current
    /// remaining volume, remaining is clamped down to keep the invariant.
    pub async fn update_bottle(&self, id: Uuid, update: BottleUpdate) -> CollectionResult<Bottle> {
        let mut bottle = self.get_bottle(id).await?;

        bottle.name = update.name;
        bottle.distillery = update.distillery;
        bottle.region = update.region;
        bottle.bottle_type = update.bottle_type;
        bottle.abv = update.abv.clamp(0.0, 100.0);
        bottle.volume_ml = update.volume_ml.max(0);
        bottle.remaining_volume_ml = bottle.remaining_volume_ml.clamp(0, bottle.volume_ml);
        bottle.purchase_date = update.purchase_date;
        bottle.purchase_price = update.purchase_price;
        bottle.rating = update.rating.unwrap_or(bottle.rating).clamp(0, 5);
        bottle.notes = update.notes;
        bottle.updated_at = Utc::now();

        sqlx::query(
            "UPDATE bottles SET name = ?, distillery = ?, region = ?, bottle_type = ?,
                                abv = ?, volume_ml = ?, remaining_volume_ml = ?,
                                purchase_date = ?, purchase_price = ?, rating = ?,
                                notes = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&bottle.name)
        .bind(&bottle.distillery)
        .bind(&bottle.region)
        .bind(&bottle.bottle_type)
        .bind(bottle.abv)
        .bind(bottle.volume_ml)
        .bind(bottle.remaining_volume_ml)
        .bind(bottle.purchase_date)
        .bind(bottle.purchase_price)
        .bind(bottle.rating)
        .bind(&bottle.notes)
        .bind(bottle.updated_at)
        .bind(bottle.id)
        .execute(&*self.db)
        .await?;

        Ok(bottle)
    }

    /// Delete a bottle; its drinking logs cascade with it.
    pub async fn delete_bottle(&self, id: Uuid) -> CollectionResult<()> {
        let result = sqlx::query("DELETE FROM bottles WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CollectionError::BottleNotFound(id));
        }
        Ok(())
    }

    /// Pick a random bottle, `None` when the collection is empty.
    pub async fn random_bottle(&self) -> CollectionResult<Option<Bottle>> {
        let bottles = fetch_all_bottles(&self.db).await?;
        if bottles.is_empty() {
            return Ok(None);
        }
        let idx = rand::rng().random_range(0..bottles.len());
        Ok(bottles.into_iter().nth(idx))
    }

    /// All drinking logs, newest first. Feeds the statistics snapshot.
    pub async fn all_logs(&self) -> CollectionResult<Vec<DrinkingLog>> {
        let logs = sqlx::query_as::<_, DrinkingLog>(
            "SELECT id, bottle_id, volume_ml, date, notes, created_at
             FROM drinking_logs ORDER BY date DESC",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(logs)
    }

    pub async fn list_wishlist(&self, search: Option<&str>) -> CollectionResult<Vec<WishlistItem>> {
        let mut items = sqlx::query_as::<_, WishlistItem>(
            "SELECT id, name, distillery, priority, target_price, notes, created_at
             FROM wishlist_items ORDER BY priority DESC, created_at DESC",
        )
        .fetch_all(&*self.db)
        .await?;
        if let Some(query) = search {
            items.retain(|i| i.matches(query));
        }
        Ok(items)
    }

    pub async fn get_wishlist_item(&self, id: Uuid) -> CollectionResult<WishlistItem> {
        sqlx::query_as::<_, WishlistItem>(
            "SELECT id, name, distillery, priority, target_price, notes, created_at
             FROM wishlist_items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?
        .ok_or(CollectionError::WishlistItemNotFound(id))
    }

    pub async fn create_wishlist_item(
        &self,
        new: NewWishlistItem,
    ) -> CollectionResult<WishlistItem> {
        let item = WishlistItem {
            id: Uuid::new_v4(),
            name: new.name,
            distillery: new.distillery,
            priority: new.priority.unwrap_or(3).clamp(1, 5),
            target_price: new.target_price,
            notes: new.notes,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO wishlist_items (id, name, distillery, priority, target_price,
                                         notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.distillery)
        .bind(item.priority)
        .bind(item.target_price)
        .bind(&item.notes)
        .bind(item.created_at)
        .execute(&*self.db)
        .await?;

        Ok(item)
    }

    pub async fn update_wishlist_item(
        &self,
        id: Uuid,
        update: NewWishlistItem,
    ) -> CollectionResult<WishlistItem> {
        let mut item = self.get_wishlist_item(id).await?;
        item.name = update.name;
        item.distillery = update.distillery;
        item.priority = update.priority.unwrap_or(item.priority).clamp(1, 5);
        item.target_price = update.target_price;
        item.notes = update.notes;

        sqlx::query(
            "UPDATE wishlist_items SET name = ?, distillery = ?, priority = ?,
                                       target_price = ?, notes = ?
             WHERE id = ?",
        )
        .bind(&item.name)
        .bind(&item.distillery)
        .bind(item.priority)
        .bind(item.target_price)
        .bind(&item.notes)
        .bind(item.id)
        .execute(&*self.db)
        .await?;

        Ok(item)
    }

    pub async fn delete_wishlist_item(&self, id: Uuid) -> CollectionResult<()> {
        let result = sqlx::query("DELETE FROM wishlist_items WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CollectionError::WishlistItemNotFound(id));
        }
        Ok(())
    }

    /// Convert a wishlist item into a bottle: copy the shared fields, then
    /// delete the item. The two steps are intentionally separate saves; a
    /// failure between them leaves both records, never neither.
    pub async fn purchase_wishlist_item(
        &self,
        id: Uuid,
        details: PurchaseDetails,
    ) -> CollectionResult<Bottle> {
        let item = self.get_wishlist_item(id).await?;

        let bottle = self
            .create_bottle(NewBottle {
                name: item.name.clone(),
                distillery: item.distillery.clone(),
                region: None,
                bottle_type: details.bottle_type,
                abv: details.abv,
                volume_ml: details.volume_ml,
                remaining_volume_ml: None,
                purchase_date: details.purchase_date.or_else(|| Some(Utc::now())),
                purchase_price: details.purchase_price.or(item.target_price),
                rating: None,
                notes: item.notes.clone(),
            })
            .await?;

        self.delete_wishlist_item(id).await?;
        Ok(bottle)
    }

    pub async fn settings(&self) -> CollectionResult<NotificationSettings> {
        Ok(fetch_settings(&self.db).await?)
    }

    /// Replace the notification settings. The threshold is clamped into
    /// `[0, 100]` percent.
    pub async fn update_settings(
        &self,
        mut settings: NotificationSettings,
    ) -> CollectionResult<NotificationSettings> {
        settings.low_stock_threshold = settings.low_stock_threshold.clamp(0.0, 100.0);
        sqlx::query(
            "UPDATE notification_settings SET enabled = ?, low_stock_threshold = ?,
                    notify_at_30_days = ?, notify_at_60_days = ?, notify_at_90_days = ?
             WHERE id = 1",
        )
        .bind(settings.enabled)
        .bind(settings.low_stock_threshold)
        .bind(settings.notify_at_30_days)
        .bind(settings.notify_at_60_days)
        .bind(settings.notify_at_90_days)
        .execute(&*self.db)
        .await?;
        Ok(settings)
    }

    /// Delete every bottle (logs cascade) and wishlist item. Returns the
    /// number of bottles and wishlist items removed.
    pub async fn purge_all(&self) -> CollectionResult<(u64, u64)> {
        let bottles = sqlx::query("DELETE FROM bottles")
            .execute(&*self.db)
            .await?
            .rows_affected();
        let wishlist = sqlx::query("DELETE FROM wishlist_items")
            .execute(&*self.db)
            .await?
            .rows_affected();
        Ok((bottles, wishlist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ledger::LedgerService;
    use crate::services::testing::memory_pool;

    fn new_bottle(name: &str) -> NewBottle {
        NewBottle {
            name: name.into(),
            distillery: "Springbank".into(),
            region: Some("Campbeltown".into()),
            bottle_type: "Single Malt".into(),
            abv: 46.0,
            volume_ml: 700,
            remaining_volume_ml: None,
            purchase_date: None,
            purchase_price: Some(9800),
            rating: Some(9),
            notes: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_full_and_clamps_rating() {
        let db = memory_pool().await;
        let service = CollectionService::new(db);

        let bottle = service.create_bottle(new_bottle("Springbank 10")).await.unwrap();
        assert_eq!(bottle.remaining_volume_ml, 700);
        assert_eq!(bottle.rating, 5);
        assert!(!bottle.is_opened());

        let fetched = service.get_bottle(bottle.id).await.unwrap();
        assert_eq!(fetched.name, "Springbank 10");
    }

    #[tokio::test]
    async fn search_filters_by_name_and_distillery() {
        let db = memory_pool().await;
        let service = CollectionService::new(db);
        service.create_bottle(new_bottle("Springbank 10")).await.unwrap();
        let mut other = new_bottle("Ardbeg Uigeadail");
        other.distillery = "Ardbeg".into();
        service.create_bottle(other).await.unwrap();

        let hits = service.list_bottles(Some("ardbeg")).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distillery, "Ardbeg");

        let all = service.list_bottles(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn shrinking_volume_clamps_remaining() {
        let db = memory_pool().await;
        let service = CollectionService::new(db);
        let bottle = service.create_bottle(new_bottle("Springbank 10")).await.unwrap();

        let update = BottleUpdate {
            name: bottle.name.clone(),
            distillery: bottle.distillery.clone(),
            region: bottle.region.clone(),
            bottle_type: bottle.bottle_type.clone(),
            abv: bottle.abv,
            volume_ml: 500,
            purchase_date: None,
            purchase_price: bottle.purchase_price,
            rating: Some(bottle.rating),
            notes: None,
        };
        let updated = service.update_bottle(bottle.id, update).await.unwrap();
        assert_eq!(updated.volume_ml, 500);
        assert_eq!(updated.remaining_volume_ml, 500);
    }

    #[tokio::test]
    async fn deleting_a_bottle_cascades_its_logs() {
        let db = memory_pool().await;
        let service = CollectionService::new(db.clone());
        let ledger = LedgerService::new(db.clone());

        let bottle = service.create_bottle(new_bottle("Springbank 10")).await.unwrap();
        ledger.consume_standard_pour(bottle.id).await.unwrap();
        assert_eq!(service.all_logs().await.unwrap().len(), 1);

        service.delete_bottle(bottle.id).await.unwrap();
        assert!(service.all_logs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn purchase_converts_wishlist_item_into_bottle() {
        let db = memory_pool().await;
        let service = CollectionService::new(db);

        let item = service
            .create_wishlist_item(NewWishlistItem {
                name: "Clynelish 14".into(),
                distillery: "Clynelish".into(),
                priority: Some(7),
                target_price: Some(8200),
                notes: Some("Birthday candidate".into()),
            })
            .await
            .unwrap();
        assert_eq!(item.priority, 5);

        let bottle = service
            .purchase_wishlist_item(
                item.id,
                PurchaseDetails {
                    bottle_type: "Single Malt".into(),
                    abv: 46.0,
                    volume_ml: 700,
                    purchase_date: None,
                    purchase_price: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(bottle.name, "Clynelish 14");
        assert_eq!(bottle.purchase_price, Some(8200));
        assert_eq!(bottle.notes.as_deref(), Some("Birthday candidate"));
        assert!(service.list_wishlist(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn settings_roundtrip_clamps_threshold() {
        let db = memory_pool().await;
        let service = CollectionService::new(db);

        let defaults = service.settings().await.unwrap();
        assert!(!defaults.enabled);
        assert_eq!(defaults.low_stock_threshold, 10.0);

        let stored = service
            .update_settings(NotificationSettings {
                enabled: true,
                low_stock_threshold: 250.0,
                notify_at_30_days: true,
                notify_at_60_days: false,
                notify_at_90_days: true,
            })
            .await
            .unwrap();
        assert_eq!(stored.low_stock_threshold, 100.0);

        let reloaded = service.settings().await.unwrap();
        assert!(reloaded.enabled);
        assert!(reloaded.notify_at_90_days);
    }

    #[tokio::test]
    async fn purge_removes_everything() {
        let db = memory_pool().await;
        let service = CollectionService::new(db);
        service.create_bottle(new_bottle("A")).await.unwrap();
        service.create_bottle(new_bottle("B")).await.unwrap();
        service
            .create_wishlist_item(NewWishlistItem {
                name: "C".into(),
                distillery: "D".into(),
                priority: None,
                target_price: None,
                notes: None,
            })
            .await
            .unwrap();

        let (bottles, wishlist) = service.purge_all().await.unwrap();
        assert_eq!(bottles, 2);
        assert_eq!(wishlist, 1);
        assert!(service.list_bottles(None).await.unwrap().is_empty());
    }
}
