//! HTTP handlers for the purchase wishlist.

use crate::{
    AppState,
    errors::AppError,
    handlers::bottle_handlers::SearchQuery,
    services::collection::{NewWishlistItem, PurchaseDetails},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

/// GET `/wishlist` — list items, optionally filtered with `?q=`.
pub async fn list_wishlist(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let items = state.collection.list_wishlist(query.q.as_deref()).await?;
    Ok(Json(items))
}

/// POST `/wishlist` — add an item.
pub async fn create_wishlist_item(
    State(state): State<AppState>,
    Json(payload): Json<NewWishlistItem>,
) -> Result<impl IntoResponse, AppError> {
    let item = state.collection.create_wishlist_item(payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT `/wishlist/{id}` — edit an item.
pub async fn update_wishlist_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewWishlistItem>,
) -> Result<impl IntoResponse, AppError> {
    let item = state.collection.update_wishlist_item(id, payload).await?;
    Ok(Json(item))
}

/// DELETE `/wishlist/{id}`.
pub async fn delete_wishlist_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.collection.delete_wishlist_item(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/wishlist/{id}/purchase` — convert the item into a bottle.
pub async fn purchase_wishlist_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PurchaseDetails>,
) -> Result<impl IntoResponse, AppError> {
    let bottle = state.collection.purchase_wishlist_item(id, payload).await?;
    Ok((StatusCode::CREATED, Json(bottle)))
}
