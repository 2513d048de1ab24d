//! Represents a tracked whiskey bottle in the collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A whiskey bottle with its purchase and consumption state.
///
/// Remaining volume is kept in the closed range `[0, volume_ml]`; every
/// mutation clamps into that range instead of rejecting the input. The
/// opened date is set exactly once, the first time the remaining volume
/// drops below the total.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Bottle {
    /// Unique identifier for this bottle (UUID for internal DB use).
    pub id: Uuid,

    /// Display name, e.g. "Lagavulin 16".
    pub name: String,

    /// Distillery that produced the bottle.
    pub distillery: String,

    /// Region of origin (e.g. "Islay"), if known.
    pub region: Option<String>,

    /// Whiskey type used for the distribution chart (e.g. "Single Malt").
    pub bottle_type: String,

    /// Alcohol by volume, percent.
    pub abv: f64,

    /// Total bottle volume in milliliters.
    pub volume_ml: i64,

    /// Remaining volume in milliliters. Invariant: `0 <= remaining <= volume`.
    pub remaining_volume_ml: i64,

    /// When the bottle was purchased.
    pub purchase_date: Option<DateTime<Utc>>,

    /// Purchase price in currency minor units.
    pub purchase_price: Option<i64>,

    /// Set on first consumption; `None` means the bottle is unopened.
    pub opened_date: Option<DateTime<Utc>>,

    /// User rating, 0–5.
    pub rating: i64,

    /// Free-form tasting notes.
    pub notes: Option<String>,

    /// When this record was created.
    pub created_at: DateTime<Utc>,

    /// When this record was last modified.
    pub updated_at: DateTime<Utc>,
}

impl Bottle {
    /// Whether the bottle has been opened at least once.
    pub fn is_opened(&self) -> bool {
        self.opened_date.is_some()
    }

    /// Remaining volume as a percentage of the total, 0 when the bottle
    /// has no recorded volume.
    pub fn remaining_percentage(&self) -> f64 {
        if self.volume_ml <= 0 {
            return 0.0;
        }
        self.remaining_volume_ml as f64 / self.volume_ml as f64 * 100.0
    }

    /// Case-insensitive match against name and distillery, used by the
    /// collection search. An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.distillery.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bottle(volume: i64, remaining: i64) -> Bottle {
        Bottle {
            id: Uuid::new_v4(),
            name: "Lagavulin 16".into(),
            distillery: "Lagavulin".into(),
            region: Some("Islay".into()),
            bottle_type: "Single Malt".into(),
            abv: 43.0,
            volume_ml: volume,
            remaining_volume_ml: remaining,
            purchase_date: None,
            purchase_price: None,
            opened_date: None,
            rating: 0,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn remaining_percentage_handles_zero_volume() {
        assert_eq!(bottle(0, 0).remaining_percentage(), 0.0);
    }

    #[test]
    fn remaining_percentage_is_ratio_of_total() {
        assert!((bottle(700, 350).remaining_percentage() - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn matches_is_case_insensitive_over_name_and_distillery() {
        let b = bottle(700, 700);
        assert!(b.matches("lagavulin"));
        assert!(b.matches("16"));
        assert!(b.matches(""));
        assert!(!b.matches("ardbeg"));
    }
}
