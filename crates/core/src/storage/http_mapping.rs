//! Pure functions for mapping repository errors to HTTP status codes.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `InvalidData` -> 400 (Bad Request)
/// - `InvalidToken` -> 400 (Bad Request)
/// - `StorageFailed` -> 500 (Internal Server Error)
/// - `Serialization` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use feedrecords_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Record",
///     id: "108/urn:uuid:ABC".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::InvalidData(_) => 400,
        RepositoryError::InvalidToken(_) => 400,
        RepositoryError::StorageFailed(_) => 500,
        RepositoryError::Serialization(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let error = RepositoryError::NotFound {
            entity_type: "Record",
            id: "1/urn:uuid:ABC".to_string(),
        };
        assert_eq!(repository_error_to_status_code(&error), 404);
    }

    #[test]
    fn test_client_errors_map_to_400() {
        let invalid = RepositoryError::InvalidData("PersonId is required".to_string());
        let token = RepositoryError::InvalidToken("not base64".to_string());
        assert_eq!(repository_error_to_status_code(&invalid), 400);
        assert_eq!(repository_error_to_status_code(&token), 400);
    }

    #[test]
    fn test_storage_failed_maps_to_500() {
        let error = RepositoryError::StorageFailed("connection reset".to_string());
        assert_eq!(repository_error_to_status_code(&error), 500);
    }

    #[test]
    fn test_serialization_maps_to_500() {
        let error = RepositoryError::Serialization("bad item".to_string());
        assert_eq!(repository_error_to_status_code(&error), 500);
    }
}
