//! Defines routes for the whiskey collection tracker API.
//!
//! ## Structure
//! - **Collection endpoints**
//!   - `GET    /bottles` — list bottles (supports ?q= search)
//!   - `POST   /bottles` — add a bottle
//!   - `GET    /bottles/random` — random pick
//!   - `GET/PUT/DELETE /bottles/{id}` — one bottle
//!
//! - **Ledger endpoints**
//!   - `POST /bottles/{id}/consume` — record a pour
//!   - `POST /bottles/{id}/pour` — record a standard 30 ml pour
//!   - `PUT  /bottles/{id}/remaining` — set remaining volume
//!   - `GET  /bottles/{id}/logs` — consumption history
//!
//! - **Wishlist, statistics, settings**
//!   - `GET/POST /wishlist`, `PUT/DELETE /wishlist/{id}`,
//!     `POST /wishlist/{id}/purchase`
//!   - `GET /statistics`, `GET /reminders`, `GET/PUT /settings`,
//!     `DELETE /admin/data`

use crate::{
    AppState,
    handlers::{
        bottle_handlers::{
            bottle_logs, consume, create_bottle, delete_bottle, get_bottle, list_bottles,
            random_bottle, set_remaining, standard_pour, update_bottle,
        },
        health_handlers::{healthz, readyz},
        settings_handlers::{get_settings, pending_reminders, purge_all, update_settings},
        stats_handlers::statistics,
        wishlist_handlers::{
            create_wishlist_item, delete_wishlist_item, list_wishlist, purchase_wishlist_item,
            update_wishlist_item,
        },
    },
};
use axum::{
    Router,
    routing::{delete, get, post, put},
};

/// Build and return the router for the whole API.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // collection
        .route("/bottles", get(list_bottles).post(create_bottle))
        .route("/bottles/random", get(random_bottle))
        .route(
            "/bottles/{id}",
            get(get_bottle).put(update_bottle).delete(delete_bottle),
        )
        // ledger
        .route("/bottles/{id}/consume", post(consume))
        .route("/bottles/{id}/pour", post(standard_pour))
        .route("/bottles/{id}/remaining", put(set_remaining))
        .route("/bottles/{id}/logs", get(bottle_logs))
        // wishlist
        .route("/wishlist", get(list_wishlist).post(create_wishlist_item))
        .route(
            "/wishlist/{id}",
            put(update_wishlist_item).delete(delete_wishlist_item),
        )
        .route("/wishlist/{id}/purchase", post(purchase_wishlist_item))
        // statistics and settings
        .route("/statistics", get(statistics))
        .route("/reminders", get(pending_reminders))
        .route("/settings", get(get_settings).put(update_settings))
        .route("/admin/data", delete(purge_all))
}
