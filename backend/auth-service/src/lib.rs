pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod openapi;
pub mod routes;
pub mod security;

use sqlx::PgPool;
use sync_fabric::SyncPublisher;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub publisher: SyncPublisher,
    pub jwt_secret: String,
}
