pub mod bottle_handlers;
pub mod health_handlers;
pub mod settings_handlers;
pub mod stats_handlers;
pub mod wishlist_handlers;
