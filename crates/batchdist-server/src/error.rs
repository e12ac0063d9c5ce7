//! Error types for the batchdist server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use batchdist_core::DistributorError;
use serde_json::json;

/// Result type for server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Domain error from the distributor core
    #[error(transparent)]
    Distributor(#[from] DistributorError),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Distributor(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
