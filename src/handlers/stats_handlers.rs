//! HTTP handler for the statistics document.
//!
//! The aggregator itself is pure; this handler pulls a fresh snapshot of
//! bottles and logs from the store and derives everything in one pass,
//! mirroring the "refresh on change notification" pattern a view layer
//! would use.

use crate::{
    AppState,
    errors::AppError,
    services::stats::{
        CollectionStats, ConsumptionBucket, ConsumptionPeriod, CostEntry, TrendStats, TypeCount,
    },
};
use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use serde::Serialize;

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub total_bottles: usize,
    pub opened_bottles: usize,
    pub unopened_bottles: usize,
    pub opened_percentage: f64,
    pub total_investment: i64,
    pub total_remaining_volume_ml: i64,
    pub average_abv: f64,
    pub average_remaining_percentage: f64,
    pub type_distribution: Vec<TypeCount>,
    pub monthly_consumption: Vec<ConsumptionBucket>,
    pub yearly_consumption: Vec<ConsumptionBucket>,
    pub monthly_trend: TrendStats,
    pub yearly_trend: TrendStats,
    pub cost_performance: Vec<CostEntry>,
}

/// GET `/statistics` — every aggregate over the current snapshot.
pub async fn statistics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let bottles = state.collection.list_bottles(None).await?;
    let logs = state.collection.all_logs().await?;
    let stats = CollectionStats::new(&bottles, &logs, Utc::now());

    let monthly_consumption = stats.monthly_consumption();
    let yearly_consumption = stats.yearly_consumption();
    let monthly_trend = stats.trend_stats(&monthly_consumption, ConsumptionPeriod::Monthly);
    let yearly_trend = stats.trend_stats(&yearly_consumption, ConsumptionPeriod::Yearly);

    Ok(Json(StatisticsResponse {
        total_bottles: stats.total_bottles(),
        opened_bottles: stats.opened_bottles(),
        unopened_bottles: stats.unopened_bottles(),
        opened_percentage: stats.opened_percentage(),
        total_investment: stats.total_investment(),
        total_remaining_volume_ml: stats.total_remaining_volume(),
        average_abv: stats.average_abv(),
        average_remaining_percentage: stats.average_remaining_percentage(),
        type_distribution: stats.type_distribution(),
        monthly_consumption,
        yearly_consumption,
        monthly_trend,
        yearly_trend,
        cost_performance: stats.cost_performance(),
    }))
}
