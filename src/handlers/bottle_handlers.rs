//! HTTP handlers for the bottle collection and its consumption ledger.
//! Handlers stay thin: they parse the request, delegate to the services,
//! and kick off the fire-and-forget reminder reschedule after mutations.

use crate::{
    AppState,
    errors::AppError,
    services::collection::{BottleUpdate, NewBottle},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

/// Optional search filter shared by the list endpoints.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Body of `POST /bottles/{id}/consume`.
#[derive(Debug, Deserialize)]
pub struct ConsumeReq {
    pub volume_ml: i64,
    pub note: Option<String>,
}

/// Body of `PUT /bottles/{id}/remaining`.
#[derive(Debug, Deserialize)]
pub struct RemainingReq {
    pub remaining_volume_ml: i64,
}

/// GET `/bottles` — list, optionally filtered with `?q=`.
pub async fn list_bottles(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let bottles = state.collection.list_bottles(query.q.as_deref()).await?;
    Ok(Json(bottles))
}

/// POST `/bottles` — add a bottle to the collection.
pub async fn create_bottle(
    State(state): State<AppState>,
    Json(payload): Json<NewBottle>,
) -> Result<impl IntoResponse, AppError> {
    let bottle = state.collection.create_bottle(payload).await?;
    Ok((StatusCode::CREATED, Json(bottle)))
}

/// GET `/bottles/random` — pick a random bottle for tonight.
pub async fn random_bottle(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    match state.collection.random_bottle().await? {
        Some(bottle) => Ok(Json(bottle)),
        None => Err(AppError::not_found("the collection is empty")),
    }
}

/// GET `/bottles/{id}`.
pub async fn get_bottle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bottle = state.collection.get_bottle(id).await?;
    Ok(Json(bottle))
}

/// PUT `/bottles/{id}` — edit metadata. Remaining volume moves through
/// the ledger endpoints so consumption is always logged.
pub async fn update_bottle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<BottleUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let bottle = state.collection.update_bottle(id, payload).await?;
    state.scheduler.spawn_reschedule();
    Ok(Json(bottle))
}

/// DELETE `/bottles/{id}` — remove the bottle; logs cascade, pending
/// reminders for it are cancelled.
pub async fn delete_bottle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.collection.delete_bottle(id).await?;
    state.scheduler.cancel_for_bottle(id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/bottles/{id}/logs` — consumption history, newest first.
pub async fn bottle_logs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    // 404 for unknown bottles instead of an empty list.
    state.collection.get_bottle(id).await?;
    let logs = state.ledger.logs_for_bottle(id).await?;
    Ok(Json(logs))
}

/// POST `/bottles/{id}/consume` — record a pour.
pub async fn consume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConsumeReq>,
) -> Result<impl IntoResponse, AppError> {
    let bottle = state
        .ledger
        .record_consumption(id, payload.volume_ml, payload.note)
        .await?;
    state.scheduler.spawn_reschedule();
    Ok(Json(bottle))
}

/// POST `/bottles/{id}/pour` — record a standard 30 ml pour.
pub async fn standard_pour(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let bottle = state.ledger.consume_standard_pour(id).await?;
    state.scheduler.spawn_reschedule();
    Ok(Json(bottle))
}

/// PUT `/bottles/{id}/remaining` — set remaining volume directly; a
/// decrease is logged as consumption.
pub async fn set_remaining(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RemainingReq>,
) -> Result<impl IntoResponse, AppError> {
    let bottle = state
        .ledger
        .set_remaining_volume(id, payload.remaining_volume_ml)
        .await?;
    state.scheduler.spawn_reschedule();
    Ok(Json(bottle))
}
