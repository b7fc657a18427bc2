pub mod api;
pub mod config;
pub mod db;
pub mod email;
pub mod errors;
pub mod models;
pub mod security;

use std::sync::Arc;

use crate::db::connection::DbPool;
use crate::email::NotificationSender;

/// Shared application state handed to every handler.
pub struct AppState {
    pub pool: DbPool,
    pub sender: Arc<dyn NotificationSender>,
    pub admin_token: String,
}
