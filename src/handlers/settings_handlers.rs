//! HTTP handlers for notification settings, the pending reminder set,
//! and the delete-everything escape hatch.

use crate::{AppState, errors::AppError, models::settings::NotificationSettings};
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

/// GET `/settings`.
pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let settings = state.collection.settings().await?;
    Ok(Json(settings))
}

/// PUT `/settings` — replace the notification settings and reschedule
/// reminders under the new toggles.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<NotificationSettings>,
) -> Result<impl IntoResponse, AppError> {
    let settings = state.collection.update_settings(payload).await?;
    state.scheduler.spawn_reschedule();
    Ok(Json(settings))
}

/// GET `/reminders` — the pending reminder set, for inspection.
pub async fn pending_reminders(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.scheduler.pending())
}

/// DELETE `/admin/data` — delete all bottles (logs cascade) and wishlist
/// items, then clear pending reminders.
pub async fn purge_all(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let (bottles, wishlist) = state.collection.purge_all().await?;
    tracing::info!(bottles, wishlist, "purged all data");
    state.scheduler.spawn_reschedule();
    Ok(Json(json!({
        "deleted_bottles": bottles,
        "deleted_wishlist_items": wishlist
    })))
}
