//! Responses produced by the relay itself.
//!
//! The caller only ever sees an acknowledgment or a rejection that happened
//! before any destination was contacted.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::routing::ExtractError;
use crate::security::BodyError;

/// Rejections raised before dispatch.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Body(#[from] BodyError),
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Extract(_) => StatusCode::BAD_REQUEST,
            RelayError::Body(BodyError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Body(BodyError::Read(_)) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            RelayError::Extract(e @ ExtractError::EmptyPath) => json!({ "error": e.to_string() }),
            RelayError::Extract(e @ ExtractError::NoValidDestination { raw_path }) => {
                json!({ "error": e.to_string(), "rawPath": raw_path })
            }
            RelayError::Body(BodyError::TooLarge { .. }) => {
                json!({ "error": "Request body exceeds the configured limit." })
            }
            RelayError::Body(BodyError::Read(_)) => {
                json!({ "error": "Failed to read request body." })
            }
        };
        (status, Json(body)).into_response()
    }
}

/// The acknowledgment sent once every delivery has been started.
pub fn accepted() -> Response {
    (StatusCode::OK, "OK").into_response()
}
