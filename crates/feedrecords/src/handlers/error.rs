use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use feedrecords_core::record::ValidationError;
use feedrecords_core::storage::{repository_error_to_status_code, RepositoryError};
use serde_json::json;

/// Handler error rendered as `{message, error}`.
///
/// The status code comes from the wrapped error: repository errors use the
/// core mapping, validation errors and malformed JSON bodies are 400,
/// everything else is 500.
pub struct AppError {
    message: String,
    error: anyhow::Error,
}

impl AppError {
    /// Wraps `error` with a caller-facing summary.
    pub fn new(message: impl Into<String>, error: impl Into<anyhow::Error>) -> Self {
        Self {
            message: message.into(),
            error: error.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        if let Some(repo_error) = self.error.downcast_ref::<RepositoryError>() {
            let code = repository_error_to_status_code(repo_error);
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        } else if self.error.is::<ValidationError>() || self.error.is::<JsonRejection>() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(message = %self.message, error = %self.error, "Request failed");
        } else {
            tracing::debug!(%status, message = %self.message, error = %self.error, "Request rejected");
        }

        (
            status,
            Json(json!({
                "message": self.message,
                "error": self.error.to_string(),
            })),
        )
            .into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new("Invalid request body", rejection)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::new("Validation error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let not_found = AppError::new(
            "Error updating record processed status",
            RepositoryError::NotFound {
                entity_type: "Record",
                id: "1/urn:uuid:0".to_string(),
            },
        );
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let invalid = AppError::new("x", RepositoryError::InvalidToken("bad".to_string()));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let validation = AppError::from(ValidationError::EmptyBatch);
        assert_eq!(validation.status_code(), StatusCode::BAD_REQUEST);

        let storage = AppError::new("x", RepositoryError::StorageFailed("down".to_string()));
        assert_eq!(storage.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let other = AppError::new("x", anyhow::anyhow!("boom"));
        assert_eq!(other.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
