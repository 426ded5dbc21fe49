use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    database: DatabaseHealth,
}

#[derive(Serialize)]
struct DatabaseHealth {
    connected: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// `GET /health`
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match state.db.ping().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "Database ping failed");
            false
        }
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth { connected },
    })
}
