use sea_orm::DatabaseConnection;

use crate::config::Config;

/// Shared application state available to all request handlers via Axum's `State` extractor.
///
/// The connection pool is owned here rather than in a global, so each test can build its own
/// router over an isolated in-memory database.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
}
