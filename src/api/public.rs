//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;

use crate::core::Error;

// Errors

/// HTTP status for a core error. Only lookups and malformed requests
/// get their own status, everything else is a 500.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::RoleNotFound(_) | Error::SpeakerNotFound(_) => StatusCode::NOT_FOUND,
        Error::RoleExists(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub struct ApiError(anyhow::Error);

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .downcast_ref::<Error>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Always log the error
        if status.is_server_error() {
            tracing::error!("{}", self.0);
        } else {
            tracing::debug!("{}", self.0);
        }

        (status, Json(json!({"detail": self.0.to_string()}))).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod conversation {
    pub use crate::api::routes::conversation::public::*;
}

pub mod roles {
    pub use crate::api::routes::roles::public::*;
}
