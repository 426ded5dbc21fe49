mod extract;
mod games;
mod health;
mod reviews;
mod users;

use axum::Router;
use axum::routing::get;
use serde::Serialize;

use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /` - plain-text banner
/// - `GET /health` - liveness plus database connectivity
/// - `/users`, `/games`, `/reviews` - CRUD resources
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .merge(health::router())
        .nest("/users", users::router())
        .nest("/games", games::router())
        .nest("/reviews", reviews::router())
}

/// `GET /`
async fn index() -> &'static str {
    "Index for Game/Review/User API"
}

/// Body returned by successful deletes.
#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

impl MessageResponse {
    fn deleted(entity: &str) -> Self {
        Self {
            message: format!("{entity} deleted"),
        }
    }
}
