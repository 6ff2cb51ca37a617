use thiserror::Error;

use crate::pagination::TokenError;
use crate::record::ValidationError;

/// Errors that can occur during record store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid pagination token: {0}")]
    InvalidToken(String),
    #[error("Storage operation failed: {0}")]
    StorageFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<ValidationError> for RepositoryError {
    fn from(error: ValidationError) -> Self {
        RepositoryError::InvalidData(error.to_string())
    }
}

impl From<TokenError> for RepositoryError {
    fn from(error: TokenError) -> Self {
        RepositoryError::InvalidToken(error.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_not_found_display() {
        let error = RepositoryError::NotFound {
            entity_type: "Record",
            id: "108/urn:uuid:ABC".to_string(),
        };
        assert_eq!(error.to_string(), "Record not found: 108/urn:uuid:ABC");
    }

    #[test]
    fn test_repository_error_storage_failed_display() {
        let error = RepositoryError::StorageFailed("throughput exceeded".to_string());
        assert_eq!(
            error.to_string(),
            "Storage operation failed: throughput exceeded"
        );
    }

    #[test]
    fn test_repository_error_serialization_display() {
        let error = RepositoryError::Serialization("missing attribute Feed".to_string());
        assert_eq!(
            error.to_string(),
            "Serialization error: missing attribute Feed"
        );
    }

    #[test]
    fn test_validation_error_converts_to_invalid_data() {
        let error: RepositoryError = ValidationError::MissingField("PersonId").into();
        assert_eq!(
            error,
            RepositoryError::InvalidData("PersonId is required".to_string())
        );
    }

    #[test]
    fn test_token_error_converts_to_invalid_token() {
        let error: RepositoryError = TokenError::InvalidBase64.into();
        assert_eq!(
            error.to_string(),
            "Invalid pagination token: nextToken is not valid base64"
        );
    }
}
