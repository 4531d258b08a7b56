//! HTTP mapping for engine and handler failures.
//!
//! [`AppError`] bridges [`RoomError`] and plain web failures into HTTP
//! responses. Engine validation errors keep their stable machine codes and
//! field scoping so host frontends can re-display them next to the
//! offending input; everything else gets a generic web code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use roomshare_core::RoomError;
use serde::Serialize;
use std::fmt;

/// Error returned by every handler in this crate.
///
/// Implements `IntoResponse`, so handlers can return
/// `Result<Json<T>, AppError>` and use `?` on engine calls.
#[derive(Debug)]
pub struct AppError {
    /// Response status
    status: StatusCode,
    /// Machine-readable code (engine form codes or web codes)
    code: String,
    /// User-facing message
    message: String,
    /// Form field the error belongs to, for re-display
    field: Option<&'static str>,
    /// Root cause, logged on 5xx and never serialized
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Creates an application error.
    #[must_use]
    pub const fn new(status: StatusCode, code: String, message: String) -> Self {
        Self {
            status,
            code,
            message,
            field: None,
            source: None,
        }
    }

    /// Attaches an internal source error for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Creates a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "BAD_REQUEST".to_owned(),
            message.into(),
        )
    }

    /// Creates a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND".to_owned(),
            format!("{resource} {id} not found"),
        )
    }

    /// Creates a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_ERROR".to_owned(),
            message.into(),
        )
    }

    /// Creates a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_SERVER_ERROR".to_owned(),
            message.into(),
        )
    }

    /// Maps an engine error raised by a submitting form.
    ///
    /// Validation variants become field-scoped 422s so the form can
    /// re-display them, including `room_not_found` from a join form (a bare
    /// lookup maps to 404 via `From` instead). Everything else falls back to
    /// the standard mapping.
    #[must_use]
    pub fn form(err: RoomError) -> Self {
        if err.is_validation() {
            Self {
                status: StatusCode::UNPROCESSABLE_ENTITY,
                code: err.code().to_owned(),
                message: err.to_string(),
                field: err.field(),
                source: None,
            }
        } else {
            Self::from(err)
        }
    }

    /// The HTTP status this error responds with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        let source: &(dyn std::error::Error + 'static) = self.source.as_deref()?;
        Some(source)
    }
}

impl From<RoomError> for AppError {
    fn from(err: RoomError) -> Self {
        let status = match &err {
            RoomError::RoomNotFound => StatusCode::NOT_FOUND,
            RoomError::AlreadyInRoom => StatusCode::CONFLICT,
            RoomError::PermissionDenied => StatusCode::FORBIDDEN,
            RoomError::PasswordHash(_) | RoomError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let code = err.code().to_owned();
        if status.is_server_error() {
            return Self {
                status,
                code,
                message: "An internal error occurred".to_owned(),
                field: None,
                source: Some(anyhow::Error::new(err)),
            };
        }
        Self {
            status,
            code,
            message: err.to_string(),
            // Bare room_not_found lookups respond 404 without field scoping;
            // AppError::form keeps the field for join-form re-display.
            field: if status == StatusCode::UNPROCESSABLE_ENTITY {
                err.field()
            } else {
                None
            },
            source: None,
        }
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Machine-readable code.
    code: String,
    /// Human-readable message.
    message: String,
    /// Form field the error is scoped to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    error = %source,
                    "request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "request failed"
                ),
            }
        }
        let body = ErrorResponse {
            code: self.code,
            message: self.message,
            field: self.field,
        };
        (self.status, Json(body)).into_response()
    }
}
