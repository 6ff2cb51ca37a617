//! Error types for DynamoDB operations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DynamodbError>;

#[derive(Error, Debug)]
pub enum DynamodbError {
    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("Table '{table_name}' not found")]
    TableNotFound { table_name: String },

    #[error("Table '{table_name}' is still being created or updated")]
    TableBusy { table_name: String },

    #[error("{count} items were not written by the batch")]
    UnprocessedItems { count: usize },

    #[error("Operation cancelled by user")]
    UserCancelled,

    #[error("Timeout waiting for table to become active")]
    TableActivationTimeout,

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl DynamodbError {
    /// Wraps any SDK or builder error, keeping its full source chain in the message.
    pub fn sdk<E>(err: E) -> Self
    where
        E: std::error::Error,
    {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::AwsSdk(message)
    }
}
