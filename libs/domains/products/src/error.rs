use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

use crate::response;
use crate::validation::FieldViolation;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Validation failed: {}", join_violations(.0))]
    Validation(Vec<FieldViolation>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
}

pub type ProductResult<T> = Result<T, ProductError>;

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Convert ProductError to AppError for the shared JSON error format.
///
/// Validation and not-found have dedicated wire formats and are rendered by
/// [`response`] instead; the mapping here is their fallback.
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(violations) => {
                AppError::BadRequest(join_violations(&violations))
            }
            ProductError::NotFound(what) => AppError::NotFound(what),
            ProductError::Upload(msg) => AppError::Storage(msg),
            ProductError::Persistence(msg) => AppError::Database(msg),
            ProductError::BadRequest(msg) => AppError::BadRequest(msg),
            ProductError::Multipart(e) => AppError::Multipart(e),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        match self {
            ProductError::Validation(violations) => response::validation_failure(&violations),
            ProductError::NotFound(what) => {
                tracing::debug!(%what, "Resource not found");
                response::not_found()
            }
            other => AppError::from(other).into_response(),
        }
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Persistence(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_upload_maps_to_storage_error() {
        let response = ProductError::Upload("disk full".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_persistence_maps_to_500() {
        let response = ProductError::Persistence("timeout".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_display_lists_every_field() {
        let err = ProductError::Validation(vec![
            FieldViolation::new("name", "must not be empty"),
            FieldViolation::new("price", "must be greater than 0"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: field name must not be empty, field price must be greater than 0"
        );
    }
}
