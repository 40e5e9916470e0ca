//! API error type and its HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use storage::StorageError;
use thiserror::Error;
use tracing::{debug, error};

/// Errors surfaced to API clients
#[derive(Debug, Error)]
pub enum ApiError {
    /// Frame body is not a valid landmark/rotation record
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    /// Frames arrive while monitoring is stopped
    #[error("Monitoring is stopped")]
    NotRunning,

    /// Settings could not be written
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidFrame(_) => StatusCode::BAD_REQUEST,
            ApiError::NotRunning => StatusCode::CONFLICT,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            debug!("Request rejected: {}", self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
