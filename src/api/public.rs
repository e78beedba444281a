//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

use crate::core::SchedulerError;

// Errors

pub struct ApiError(SchedulerError);

#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub kind: String,
}

/// Convert `ApiError` into an Axum compatible response. Every kind is
/// a 400, callers branch on `kind` in the body.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{} ({})", self.0, self.0.kind());

        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                detail: self.0.to_string(),
                kind: self.0.kind().to_string(),
            }),
        )
            .into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// SchedulerError>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<SchedulerError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod schedule {
    pub use crate::api::routes::schedule::public::*;
}
