//! Mapping domain errors to HTTP responses.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use volman::{ErrorKind, VolmanError};

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code, repeated for clients that only see the body.
    pub status: u16,
    /// Human-oriented detail. Carries backend stderr for 500s.
    pub message: String,
}

/// A [`VolmanError`] on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub VolmanError);

/// Status code for an error category.
#[must_use]
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Caller => StatusCode::BAD_REQUEST,
        ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Backend => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<VolmanError> for ApiError {
    fn from(err: VolmanError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(VolmanError::InvalidRequest {
            message: rejection.body_text(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::info!(status = status.as_u16(), error = %self.0, "Request refused");
        }

        let body = ErrorBody {
            status: status.as_u16(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
