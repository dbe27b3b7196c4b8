//! API error responses

use crate::output::OutputError;
use crate::storage::StorageError;
use crate::SiteLensError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Error returned by a handler, rendered as `{ "error": message }`
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized,
    NotFound(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::BadRequest(msg) | Self::NotFound(msg) | Self::Internal(msg) => msg,
            Self::Unauthorized => "Unauthorized",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(msg) = &self {
            tracing::error!("Request failed: {}", msg);
        }
        let body = Json(json!({ "error": self.message() }));
        (self.status(), body).into_response()
    }
}

/// Bad input and unreachable pages are the caller's problem; anything else
/// is ours
impl From<SiteLensError> for ApiError {
    fn from(err: SiteLensError) -> Self {
        match err {
            SiteLensError::InvalidUrl(_) | SiteLensError::Fetch { .. } => {
                Self::BadRequest(err.to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::AuditNotFound(id) => Self::NotFound(format!("Audit {} not found", id)),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<OutputError> for ApiError {
    fn from(err: OutputError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Background task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(SiteLensError::InvalidUrl("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(StorageError::AuditNotFound(3)).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(OutputError::Format("bad".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
