//! Error types with HTTP status code mapping.
//!
//! [`PanelError`] is the central error type for the panel server. Each
//! variant maps to a specific HTTP status code and structured JSON error
//! response. [`ClientError`] covers the page client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "asset not found: /missing.html"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                 |
/// |-----------|-----------------|-----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request             |
/// | 2000–2999 | Not Found       | 404 Not Found               |
/// | 3000–3999 | Server          | 500 Internal Server Error   |
/// | 4000–4999 | Event Stream    | 422 / 503                   |
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// Command name is not a valid `/api/<name>` path segment.
    #[error("invalid command: {0:?}")]
    InvalidCommand(String),

    /// Requested asset does not exist.
    #[error("asset not found: {0}")]
    AssetNotFound(String),

    /// Requested asset path was refused (too long or escaping the root).
    #[error("path rejected: {0}")]
    PathRejected(String),

    /// Event has neither id, name nor data.
    #[error("event is empty")]
    EmptyEvent,

    /// Encoded event exceeds the configured size.
    #[error("event too large: {len} bytes exceeds {max}")]
    EventTooLarge {
        /// Encoded length including the terminating blank line.
        len: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Event name contains a line break.
    #[error("invalid event name: {0:?}")]
    InvalidEventName(String),

    /// Every EventSource session slot is taken.
    #[error("all {0} event stream sessions are in use")]
    SessionLimitReached(usize),

    /// Filesystem failure while serving an asset.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PanelError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidCommand(_) => 1001,
            Self::PathRejected(_) => 1002,
            Self::AssetNotFound(_) => 2001,
            Self::Io(_) => 3001,
            Self::Internal(_) => 3000,
            Self::EmptyEvent => 4001,
            Self::EventTooLarge { .. } => 4002,
            Self::InvalidEventName(_) => 4003,
            Self::SessionLimitReached(_) => 4004,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCommand(_) | Self::PathRejected(_) => StatusCode::BAD_REQUEST,
            Self::AssetNotFound(_) => StatusCode::NOT_FOUND,
            Self::Io(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::EmptyEvent | Self::EventTooLarge { .. } | Self::InvalidEventName(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::SessionLimitReached(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for PanelError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Page client errors.
///
/// Only construction and control lookup can fail; stream and command
/// failures are never surfaced.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP client could not be built.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Page origin is not an absolute http(s) URL.
    #[error("invalid origin: {0}")]
    InvalidOrigin(String),

    /// No control is bound under this id.
    #[error("no control bound with id {0:?}")]
    UnknownControl(String),

    /// Bound command name is not a valid path segment.
    #[error("invalid command: {0:?}")]
    InvalidCommand(String),
}
