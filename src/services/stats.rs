//! src/services/stats.rs
//!
//! Statistics over the bottle collection and its consumption history.
//! All computations are pure functions of an injected snapshot plus an
//! injected "now", so they are deterministic under test and never touch
//! the store directly.

use crate::models::{bottle::Bottle, drinking_log::DrinkingLog};
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Granularity of the consumption chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumptionPeriod {
    Monthly,
    Yearly,
}

/// Number of buckets shown per period kind.
const MONTHLY_BUCKETS: u32 = 6;
const YEARLY_BUCKETS: u32 = 5;

/// One time bucket of the consumption chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumptionBucket {
    /// Locale label, "M月" for months and "YYYY年" for years.
    pub label: String,
    pub volume_ml: i64,
}

/// Totals over a bucketed consumption series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendStats {
    pub total_ml: i64,
    /// Total divided by the number of periods actually elapsed since the
    /// earliest log, not by the fixed window size.
    pub average_ml: i64,
}

/// One bucket of the type distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeCount {
    pub bottle_type: String,
    pub count: usize,
}

/// Price per milliliter for one bottle, cheapest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEntry {
    pub bottle_id: Uuid,
    pub name: String,
    pub price_per_ml: f64,
}

/// A read-only view over the collection snapshot.
///
/// The owning layer refreshes the snapshot on every change notification
/// and re-derives whatever it displays.
pub struct CollectionStats<'a> {
    bottles: &'a [Bottle],
    logs: &'a [DrinkingLog],
    now: DateTime<Utc>,
}

impl<'a> CollectionStats<'a> {
    pub fn new(bottles: &'a [Bottle], logs: &'a [DrinkingLog], now: DateTime<Utc>) -> Self {
        Self { bottles, logs, now }
    }

    pub fn total_bottles(&self) -> usize {
        self.bottles.len()
    }

    pub fn opened_bottles(&self) -> usize {
        self.bottles.iter().filter(|b| b.is_opened()).count()
    }

    pub fn unopened_bottles(&self) -> usize {
        self.bottles.iter().filter(|b| !b.is_opened()).count()
    }

    /// Opened bottles as a percentage of the collection, 0 when empty.
    pub fn opened_percentage(&self) -> f64 {
        if self.bottles.is_empty() {
            return 0.0;
        }
        self.opened_bottles() as f64 / self.bottles.len() as f64 * 100.0
    }

    /// Sum of purchase prices; bottles without a price contribute 0.
    pub fn total_investment(&self) -> i64 {
        self.bottles
            .iter()
            .filter_map(|b| b.purchase_price)
            .sum()
    }

    pub fn total_remaining_volume(&self) -> i64 {
        self.bottles.iter().map(|b| b.remaining_volume_ml).sum()
    }

    /// Mean ABV across the whole collection, 0 when empty.
    pub fn average_abv(&self) -> f64 {
        if self.bottles.is_empty() {
            return 0.0;
        }
        let total: f64 = self.bottles.iter().map(|b| b.abv).sum();
        total / self.bottles.len() as f64
    }

    /// Mean remaining percentage over opened bottles only, 0 when none
    /// are opened.
    pub fn average_remaining_percentage(&self) -> f64 {
        let opened: Vec<&Bottle> = self.bottles.iter().filter(|b| b.is_opened()).collect();
        if opened.is_empty() {
            return 0.0;
        }
        let total: f64 = opened.iter().map(|b| b.remaining_percentage()).sum();
        total / opened.len() as f64
    }

    /// Bottle count per type, descending by count.
    ///
    /// The sort is stable: ties keep the order in which a type was first
    /// seen in the snapshot.
    pub fn type_distribution(&self) -> Vec<TypeCount> {
        let mut groups: Vec<TypeCount> = Vec::new();
        for bottle in self.bottles {
            match groups
                .iter_mut()
                .find(|g| g.bottle_type == bottle.bottle_type)
            {
                Some(group) => group.count += 1,
                None => groups.push(TypeCount {
                    bottle_type: bottle.bottle_type.clone(),
                    count: 1,
                }),
            }
        }
        groups.sort_by(|a, b| b.count.cmp(&a.count));
        groups
    }

    /// Consumption totals for the last six months, oldest first.
    pub fn monthly_consumption(&self) -> Vec<ConsumptionBucket> {
        self.consumption_buckets(ConsumptionPeriod::Monthly, MONTHLY_BUCKETS)
    }

    /// Consumption totals for the last five years, oldest first.
    pub fn yearly_consumption(&self) -> Vec<ConsumptionBucket> {
        self.consumption_buckets(ConsumptionPeriod::Yearly, YEARLY_BUCKETS)
    }

    /// Sum log volumes into the last `count` calendar periods ending at
    /// the current one. Bounds are inclusive whole days.
    fn consumption_buckets(&self, period: ConsumptionPeriod, count: u32) -> Vec<ConsumptionBucket> {
        let today = self.now.date_naive();
        let mut buckets: Vec<ConsumptionBucket> = (0..count)
            .filter_map(|offset| {
                let anchor = match period {
                    ConsumptionPeriod::Monthly => today.checked_sub_months(Months::new(offset))?,
                    ConsumptionPeriod::Yearly => {
                        NaiveDate::from_ymd_opt(today.year() - offset as i32, 1, 1)?
                    }
                };
                let (start, end, label) = period_bounds(anchor, period)?;
                let volume_ml = self
                    .logs
                    .iter()
                    .filter(|log| {
                        let day = log.date.date_naive();
                        day >= start && day <= end
                    })
                    .map(|log| log.volume_ml)
                    .sum();
                Some(ConsumptionBucket { label, volume_ml })
            })
            .collect();
        buckets.reverse();
        buckets
    }

    /// Total and per-period average over a bucketed series.
    ///
    /// The average divides by the number of periods since the earliest
    /// log (floor 1), so months before any data existed do not dilute it.
    pub fn trend_stats(&self, data: &[ConsumptionBucket], period: ConsumptionPeriod) -> TrendStats {
        let total_ml: i64 = data.iter().map(|b| b.volume_ml).sum();

        let average_ml = match self.logs.iter().map(|log| log.date).min() {
            Some(first) => {
                let first = first.date_naive();
                let today = self.now.date_naive();
                let periods = match period {
                    ConsumptionPeriod::Monthly => {
                        let months = i64::from(today.year() - first.year()) * 12
                            + i64::from(today.month()) - i64::from(first.month());
                        (months + 1).max(1)
                    }
                    ConsumptionPeriod::Yearly => {
                        (i64::from(today.year() - first.year()) + 1).max(1)
                    }
                };
                total_ml / periods
            }
            None => total_ml,
        };

        TrendStats {
            total_ml,
            average_ml,
        }
    }

    /// Unit price per milliliter, ascending (best value first).
    ///
    /// Bottles without a purchase price or with zero volume are excluded.
    pub fn cost_performance(&self) -> Vec<CostEntry> {
        let mut entries: Vec<CostEntry> = self
            .bottles
            .iter()
            .filter_map(|bottle| {
                let price = bottle.purchase_price?;
                if bottle.volume_ml <= 0 {
                    return None;
                }
                Some(CostEntry {
                    bottle_id: bottle.id,
                    name: bottle.name.clone(),
                    price_per_ml: price as f64 / bottle.volume_ml as f64,
                })
            })
            .collect();
        entries.sort_by(|a, b| a.price_per_ml.total_cmp(&b.price_per_ml));
        entries
    }
}

/// Inclusive calendar bounds and chart label for the period containing
/// `anchor`. Month: first through last day of the month. Year: Jan 1
/// through Dec 31.
fn period_bounds(
    anchor: NaiveDate,
    period: ConsumptionPeriod,
) -> Option<(NaiveDate, NaiveDate, String)> {
    match period {
        ConsumptionPeriod::Monthly => {
            let start = NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 1)?;
            let end = start
                .checked_add_months(Months::new(1))?
                .checked_sub_days(Days::new(1))?;
            Some((start, end, format!("{}月", anchor.month())))
        }
        ConsumptionPeriod::Yearly => {
            let start = NaiveDate::from_ymd_opt(anchor.year(), 1, 1)?;
            let end = NaiveDate::from_ymd_opt(anchor.year(), 12, 31)?;
            Some((start, end, format!("{}年", anchor.year())))
        }
    }
}
