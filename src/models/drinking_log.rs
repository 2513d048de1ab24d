//! Represents one consumption event recorded against a bottle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An immutable record of a pour.
///
/// Logs are created only by the consumption ledger as a side effect of a
/// pour or a remaining-volume decrease, and are cascade-deleted with their
/// owning bottle.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct DrinkingLog {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Owning bottle.
    pub bottle_id: Uuid,

    /// Volume consumed in milliliters (positive).
    pub volume_ml: i64,

    /// When the consumption happened.
    pub date: DateTime<Utc>,

    /// Optional note ("Standard pour", manual annotation, ...).
    pub notes: Option<String>,

    /// When this record was created.
    pub created_at: DateTime<Utc>,
}
