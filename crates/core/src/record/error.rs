use thiserror::Error;

/// Errors raised while validating client requests, before any store call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{field} must be in format urn:uuid:XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX where X is a hexadecimal digit (A-F, 0-9)")]
    InvalidEntryId { field: &'static str },
    #[error("{0}")]
    InvalidDmlOperation(String),
    #[error("records must contain at least one entry")]
    EmptyBatch,
    #[error("record at index {index} is invalid: {source}")]
    InvalidBatchEntry {
        index: usize,
        source: Box<ValidationError>,
    },
    #[error("limit must be a positive integer no greater than {max} (got \"{value}\")")]
    InvalidLimit { value: String, max: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        assert_eq!(
            ValidationError::MissingField("PersonId").to_string(),
            "PersonId is required"
        );
    }

    #[test]
    fn test_invalid_entry_id_display() {
        let err = ValidationError::InvalidEntryId { field: "entryId" };
        assert!(err.to_string().starts_with("entryId must be in format urn:uuid:"));
    }

    #[test]
    fn test_batch_entry_display_names_index() {
        let err = ValidationError::InvalidBatchEntry {
            index: 3,
            source: Box::new(ValidationError::MissingField("personId")),
        };
        assert_eq!(
            err.to_string(),
            "record at index 3 is invalid: personId is required"
        );
    }
}
