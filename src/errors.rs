use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{error, warn};

use crate::store::StoreError;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Body of every error response: `{"error": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// The verb a storage failure is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    Read,
    Add,
    Update,
    Delete,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Failed to {operation} data: {source}")]
    Storage {
        operation: Operation,
        #[source]
        source: StoreError,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl ServiceError {
    pub fn storage(operation: Operation) -> impl FnOnce(StoreError) -> ServiceError {
        move |source| ServiceError::Storage { operation, source }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Storage failures collapse to one message per verb.
    pub fn response_message(&self) -> String {
        match self {
            Self::NotFound(_) => "Item not found.".to_string(),
            Self::Storage { operation, .. } => format!("Failed to {} data.", operation),
            Self::BadRequest(msg) | Self::ValidationError(msg) | Self::Conflict(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let request_id = current_request_id();

        if status.is_server_error() {
            error!(request_id = ?request_id, error = %self, "request failed");
        } else {
            warn!(request_id = ?request_id, error = %self, "request rejected");
        }

        let body = ErrorResponse {
            error: self.response_message(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ServiceError>;
