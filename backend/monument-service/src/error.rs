//! Error types for monument-service.
//!
//! Two kinds cover the whole surface: caller faults and upstream-service
//! failures. The kind-to-status mapping lives in one place, the
//! `ResponseError` impl; handlers only construct or convert errors.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request itself is unusable
    #[error("{0}")]
    Validation(String),

    /// An upstream managed service failed; the detail carries its message
    #[error("{0}")]
    Service(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn service(message: impl Into<String>) -> Self {
        AppError::Service(message.into())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Service(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<firebase_identity::IdentityError> for AppError {
    fn from(err: firebase_identity::IdentityError) -> Self {
        AppError::Service(err.to_string())
    }
}

impl From<firestore_client::FirestoreError> for AppError {
    fn from(err: firestore_client::FirestoreError) -> Self {
        AppError::Service(err.to_string())
    }
}

impl From<gcs_storage::StorageError> for AppError {
    fn from(err: gcs_storage::StorageError) -> Self {
        AppError::Service(err.to_string())
    }
}

impl From<gemini_client::GeminiError> for AppError {
    fn from(err: gemini_client::GeminiError) -> Self {
        AppError::Service(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = AppError::validation("missing input");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn service_maps_to_internal_error() {
        let err = AppError::service("Firestore returned 503");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn upstream_errors_keep_their_detail() {
        let err: AppError = gemini_client::GeminiError::EmptyResponse.into();
        assert!(matches!(err, AppError::Service(_)));
        assert!(err.to_string().contains("no text candidates"));
    }
}
