//! API error types.
//!
//! Every variant maps to an HTTP status code and a JSON body of the
//! form `{"message": "..."}`.  The enum implements
//! [`axum::response::IntoResponse`] so handlers can simply return
//! `Err(ApiError::NotFound { .. })`.  Internal error details are logged
//! server-side and never cross the boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Generate a 16-character hex request ID.
pub fn generate_request_id() -> String {
    let bytes: [u8; 8] = rand::random();
    hex_upper(&bytes)
}

fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request was missing required fields or carried invalid values.
    #[error("{message}")]
    BadRequest { message: String },

    /// Authentication failed.  All causes (missing header, bad token,
    /// wrong credentials) collapse to a generic 401.
    #[error("{message}")]
    Unauthorized { message: String },

    /// The requested resource does not exist.
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    /// An uploaded file was not an acceptable image.
    #[error("{message}")]
    UnsupportedMediaType { message: String },

    /// An external provider (media host, AI endpoint) failed.
    #[error("{message}")]
    ServiceUnavailable { message: String },

    /// Unexpected internal failure.  The cause is logged, the caller
    /// sees only a generic message.
    #[error("Server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Shorthand for a `BadRequest` with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    /// Shorthand for an `Unauthorized` with the given message.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized {
            message: message.into(),
        }
    }

    /// Map this error to its HTTP status code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let ApiError::Internal(ref cause) = self {
            tracing::error!("internal error: {cause:#}");
        } else {
            tracing::debug!("request failed with {status}: {self}");
        }

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
