pub mod collection;
pub mod ledger;
pub mod reminders;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing {
    //! Shared helpers for service tests: a one-connection in-memory SQLite
    //! pool with the schema applied, plus seed data.

    use crate::models::bottle::Bottle;
    use chrono::Utc;
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;
    use uuid::Uuid;

    /// Open an in-memory SQLite pool and apply the schema.
    ///
    /// A single connection keeps every query on the same in-memory
    /// database.
    pub async fn memory_pool() -> Arc<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("open in-memory sqlite");

        let schema = include_str!("../../migrations/0001_init.sql");
        for stmt in schema.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(stmt)
                .execute(&pool)
                .await
                .expect("apply schema statement");
        }

        Arc::new(pool)
    }

    /// Insert a plain unopened bottle and return it.
    pub async fn seed_bottle(db: &SqlitePool, volume_ml: i64, remaining_ml: i64) -> Bottle {
        let now = Utc::now();
        let bottle = Bottle {
            id: Uuid::new_v4(),
            name: "Test Bottle".into(),
            distillery: "Test Distillery".into(),
            region: None,
            bottle_type: "Single Malt".into(),
            abv: 43.0,
            volume_ml,
            remaining_volume_ml: remaining_ml,
            purchase_date: None,
            purchase_price: None,
            opened_date: None,
            rating: 0,
            notes: None,
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
        .execute(db)
        .await
        .expect("seed bottle");

        bottle
    }
}
