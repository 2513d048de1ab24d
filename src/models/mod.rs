//! Core data models for the whiskey collection tracker.
//!
//! These entities represent bottles, their consumption history, and the
//! purchase wishlist. They map cleanly to database tables via
//! `sqlx::FromRow` and serialize naturally as JSON via `serde`.

pub mod bottle;
pub mod drinking_log;
pub mod settings;
pub mod wishlist;
