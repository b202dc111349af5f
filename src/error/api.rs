use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

use super::StoreError;

/// Failure at the HTTP boundary of the user routes.
///
/// Rendered as a status code plus a short plain-text reason; the underlying cause only goes
/// to the log.
#[derive(Debug, ThisError)]
pub enum ApiError {
    #[error("Invalid user ID: {detail}")]
    InvalidId { detail: String },

    #[error("Failed to read request body: {detail}")]
    BodyRead { detail: String },

    #[error("Failed to decode request body: {0}")]
    BodyDecode(#[from] serde_json::Error),

    #[error("{reason}: {source}")]
    Store {
        reason: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    /// Adapter for `map_err` that attaches the client-facing reason to a store failure.
    pub(crate) fn store(reason: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| ApiError::Store { reason, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId { .. } | ApiError::BodyRead { .. } | ApiError::BodyDecode(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store {
                source: StoreError::NotFound { .. },
                ..
            } => StatusCode::NOT_FOUND,
            // A duplicated primary identifier is a store anomaly, not a client mistake.
            ApiError::Store {
                source:
                    StoreError::Integrity { .. } | StoreError::Query { .. } | StoreError::Connect(_),
                ..
            } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text body sent to the client.
    pub fn reason(&self) -> &'static str {
        match self {
            ApiError::InvalidId { .. } => "Invalid user ID",
            ApiError::BodyRead { .. } => "Failed to read request body",
            ApiError::BodyDecode(_) => "Failed to decode request body",
            ApiError::Store { reason, .. } => *reason,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "user request failed");
        } else {
            tracing::warn!(status = %status, error = %self, "user request rejected");
        }
        (status, self.reason()).into_response()
    }
}
