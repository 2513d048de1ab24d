//! Represents an item on the purchase wishlist.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A bottle the user intends to buy.
///
/// Wishlist items live independently of the collection. Converting one
/// into a [`crate::models::bottle::Bottle`] copies the shared fields and
/// then deletes the item; the two steps are not atomic.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct WishlistItem {
    /// Internal UUID for DB indexing.
    pub id: Uuid,

    /// Display name.
    pub name: String,

    /// Distillery that produces the bottle.
    pub distillery: String,

    /// Purchase priority, 1 (low) to 5 (high).
    pub priority: i64,

    /// Target price / budget in currency minor units.
    pub target_price: Option<i64>,

    /// Free-form notes.
    pub notes: Option<String>,

    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl WishlistItem {
    /// Case-insensitive match against name and distillery.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.distillery.to_lowercase().contains(&needle)
    }
}
