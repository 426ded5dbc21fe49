use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Unified application error type that maps to JSON HTTP responses.
///
/// Every variant renders as `{ "error": "<message>" }`.
#[derive(Debug)]
pub enum AppError {
    /// 400 Bad Request
    BadRequest(String),
    /// 404 Not Found
    NotFound(String),
    /// 415 Unsupported Media Type
    UnsupportedMediaType(String),
    /// 422 Unprocessable Entity
    UnprocessableEntity(String),
    /// 500 Internal Server Error (wraps any error, logs details, returns generic message)
    Internal(anyhow::Error),
}

impl AppError {
    /// `404` for a record type, e.g. `"User not found"`.
    #[must_use]
    pub fn not_found(entity: &str) -> Self {
        Self::NotFound(format!("{entity} not found"))
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest(msg)
            | Self::NotFound(msg)
            | Self::UnsupportedMediaType(msg)
            | Self::UnprocessableEntity(msg) => msg,
            Self::Internal(err) => {
                tracing::error!("Internal server error: {err:#}");
                "An internal error occurred".to_string()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Allow `?` to automatically convert any `anyhow::Error` into `AppError::Internal`.
impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
