//! API error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::voice::CaptureError;

/// Errors returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    /// Malformed or empty request
    BadRequest(&'static str),
    /// A newer command for the same session replaced this one
    Superseded,
    /// The client's recognizer reported a failure
    Recognition(CaptureError),
    /// The place backend failed
    LookupFailed(String),
}

impl From<crate::Error> for ApiError {
    fn from(e: crate::Error) -> Self {
        match e {
            crate::Error::Capture(e) => Self::Recognition(e),
            other => Self::LookupFailed(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.to_string()),
            Self::Superseded => (
                StatusCode::CONFLICT,
                "superseded",
                "a newer command replaced this one".to_string(),
            ),
            Self::Recognition(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                e.code(),
                e.status_message().to_string(),
            ),
            Self::LookupFailed(msg) => {
                tracing::warn!(error = %msg, "place lookup failed");
                (StatusCode::SERVICE_UNAVAILABLE, "lookup_failed", msg)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: ErrorBody { code, message },
            }),
        )
            .into_response()
    }
}
