//! services/api/src/error.rs
//!
//! Startup errors for the `api` binary. Request handlers never return these;
//! they answer with a flash message instead (see `web::flash`).

use crate::config::ConfigError;
use library_core::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Connecting the pool or running the embedded migrations failed.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// The shared `reqwest` client could not be built.
    #[error("HTTP client Error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Binding the listener, serving, or preparing the upload directory failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Startup failed: {0}")]
    Internal(String),
}
