//! Error handling types and utilities.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;

/// A specialized Result type for hub-search operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Error returned when the markdown corpus cannot be loaded.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The configured docs root does not exist or is not a directory.
    #[error("docs root not found at {}", path.display())]
    RootNotFound { path: PathBuf },
    /// A markdown file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Front matter is present but is not valid TOML.
    #[error("invalid front matter in {}: {source}", path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Errors surfaced by the HTTP boundary.
///
/// Client errors carry a fixed message. `Internal` keeps the underlying error
/// for server-side logging only; the response body is always generic.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Query parameter is required")]
    MissingQuery,
    #[error("Queries must be an array")]
    InvalidBatch,
    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    /// Wrap an upstream failure with the public message for its endpoint.
    pub fn internal(message: &'static str, source: anyhow::Error) -> Self {
        Self::Internal { message, source }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingQuery | Self::InvalidBatch => StatusCode::BAD_REQUEST,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal { message, source } = &self {
            tracing::error!("{}: {:#}", message, source);
        }
        let body = serde_json::json!({ "error": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
