//! services/api/src/web/flash.rs
//!
//! The `{ level, message }` payload every form handler answers with, and the
//! mapping from port errors to HTTP status codes.

use axum::{http::StatusCode, Json};
use library_core::ports::PortError;
use serde::Serialize;
use tracing::{error, warn};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

/// A one-line message for the client to show the user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// The error half of every handler's return type.
pub type FlashError = (StatusCode, Json<Flash>);

pub type HandlerResult<T> = Result<T, FlashError>;

/// Rejects a request with an error flash.
pub fn reject(status: StatusCode, message: impl Into<String>) -> FlashError {
    (status, Json(Flash::error(message)))
}

pub fn bad_request(message: impl Into<String>) -> FlashError {
    reject(StatusCode::BAD_REQUEST, message)
}

/// Builds a `map_err` closure that logs a port failure and turns it into a flash.
///
/// `action` completes the sentence "Failed to ..." for unexpected errors.
pub fn port_failure(action: &'static str) -> impl FnOnce(PortError) -> FlashError {
    move |e| match e {
        PortError::NotFound(msg) => {
            warn!("Failed to {}: {}", action, msg);
            reject(StatusCode::NOT_FOUND, msg)
        }
        PortError::Conflict(msg) => {
            warn!("Failed to {}: {}", action, msg);
            reject(StatusCode::CONFLICT, msg)
        }
        PortError::Invalid(msg) => reject(StatusCode::BAD_REQUEST, msg),
        PortError::Unauthorized => reject(StatusCode::UNAUTHORIZED, "Please log in first."),
        PortError::Unexpected(msg) => {
            error!("Failed to {}: {}", action, msg);
            reject(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {}.", action),
            )
        }
    }
}
