//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `feedrecords_core::storage`.
//! Nothing here retries; the SDK message and request id are kept for diagnostics.

use std::error::Error;
use std::fmt::Debug;

use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::operation::RequestId;
use feedrecords_core::record::RecordKey;
use feedrecords_core::storage::RepositoryError;

const TABLE_NOT_FOUND: &str = "table not found";
const THROUGHPUT_EXCEEDED: &str = "throughput exceeded";
const REQUEST_LIMIT_EXCEEDED: &str = "request limit exceeded";
const TRANSACTION_CONFLICT: &str = "transaction conflict";
const INTERNAL_SERVER_ERROR: &str = "internal server error";

/// `"<Operation> failed[: <kind>]: <sdk error chain>[ (request id: ..)]"`
fn storage_failed<E>(operation: &str, kind: Option<&str>, err: &E) -> RepositoryError
where
    E: Error + RequestId,
{
    let mut message = format!("{operation} failed");
    if let Some(kind) = kind {
        message.push_str(": ");
        message.push_str(kind);
    }
    message.push_str(&format!(": {}", DisplayErrorContext(err)));
    if let Some(request_id) = err.request_id() {
        message.push_str(&format!(" (request id: {request_id})"));
    }
    RepositoryError::StorageFailed(message)
}

/// Map a PutItem SDK error to RepositoryError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
) -> RepositoryError {
    let err = err.into_service_error();
    let kind = match &err {
        PutItemError::ResourceNotFoundException(_) => Some(TABLE_NOT_FOUND),
        PutItemError::ProvisionedThroughputExceededException(_) => Some(THROUGHPUT_EXCEEDED),
        PutItemError::RequestLimitExceeded(_) => Some(REQUEST_LIMIT_EXCEEDED),
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            Some("item collection size limit exceeded")
        }
        PutItemError::TransactionConflictException(_) => Some(TRANSACTION_CONFLICT),
        PutItemError::InternalServerError(_) => Some(INTERNAL_SERVER_ERROR),
        _ => None,
    };
    storage_failed("PutItem", kind, &err)
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
) -> RepositoryError {
    let err = err.into_service_error();
    let kind = match &err {
        QueryError::ResourceNotFoundException(_) => Some(TABLE_NOT_FOUND),
        QueryError::ProvisionedThroughputExceededException(_) => Some(THROUGHPUT_EXCEEDED),
        QueryError::RequestLimitExceeded(_) => Some(REQUEST_LIMIT_EXCEEDED),
        QueryError::InternalServerError(_) => Some(INTERNAL_SERVER_ERROR),
        _ => None,
    };
    storage_failed("Query", kind, &err)
}

/// Map a DeleteItem SDK error to RepositoryError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
) -> RepositoryError {
    let err = err.into_service_error();
    let kind = match &err {
        DeleteItemError::ResourceNotFoundException(_) => Some(TABLE_NOT_FOUND),
        DeleteItemError::ProvisionedThroughputExceededException(_) => Some(THROUGHPUT_EXCEEDED),
        DeleteItemError::RequestLimitExceeded(_) => Some(REQUEST_LIMIT_EXCEEDED),
        DeleteItemError::TransactionConflictException(_) => Some(TRANSACTION_CONFLICT),
        DeleteItemError::InternalServerError(_) => Some(INTERNAL_SERVER_ERROR),
        _ => None,
    };
    storage_failed("DeleteItem", kind, &err)
}

/// Map a BatchWriteItem SDK error to RepositoryError.
pub fn map_batch_write_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchWriteItemError, R>,
) -> RepositoryError {
    let err = err.into_service_error();
    let kind = match &err {
        BatchWriteItemError::ResourceNotFoundException(_) => Some(TABLE_NOT_FOUND),
        BatchWriteItemError::ProvisionedThroughputExceededException(_) => {
            Some(THROUGHPUT_EXCEEDED)
        }
        BatchWriteItemError::RequestLimitExceeded(_) => Some(REQUEST_LIMIT_EXCEEDED),
        BatchWriteItemError::InternalServerError(_) => Some(INTERNAL_SERVER_ERROR),
        _ => None,
    };
    storage_failed("BatchWriteItem", kind, &err)
}

/// Map an UpdateItem SDK error to RepositoryError.
///
/// A failed `attribute_exists` condition means the record does not exist.
pub fn map_update_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<UpdateItemError, R>,
    key: &RecordKey,
) -> RepositoryError {
    let err = err.into_service_error();
    let kind = match &err {
        UpdateItemError::ConditionalCheckFailedException(_) => {
            return RepositoryError::NotFound {
                entity_type: "Record",
                id: key.to_string(),
            };
        }
        UpdateItemError::ResourceNotFoundException(_) => Some(TABLE_NOT_FOUND),
        UpdateItemError::ProvisionedThroughputExceededException(_) => Some(THROUGHPUT_EXCEEDED),
        UpdateItemError::RequestLimitExceeded(_) => Some(REQUEST_LIMIT_EXCEEDED),
        UpdateItemError::TransactionConflictException(_) => Some(TRANSACTION_CONFLICT),
        UpdateItemError::InternalServerError(_) => Some(INTERNAL_SERVER_ERROR),
        _ => None,
    };
    storage_failed("UpdateItem", kind, &err)
}

/// Map a Scan SDK error to RepositoryError.
pub fn map_scan_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<ScanError, R>,
) -> RepositoryError {
    let err = err.into_service_error();
    let kind = match &err {
        ScanError::ResourceNotFoundException(_) => Some(TABLE_NOT_FOUND),
        ScanError::ProvisionedThroughputExceededException(_) => Some(THROUGHPUT_EXCEEDED),
        ScanError::RequestLimitExceeded(_) => Some(REQUEST_LIMIT_EXCEEDED),
        ScanError::InternalServerError(_) => Some(INTERNAL_SERVER_ERROR),
        _ => None,
    };
    storage_failed("Scan", kind, &err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::types::error::{
        ConditionalCheckFailedException, ProvisionedThroughputExceededException,
    };

    #[test]
    fn test_throughput_error_keeps_sdk_message() {
        let service_error = QueryError::ProvisionedThroughputExceededException(
            ProvisionedThroughputExceededException::builder()
                .message("The level of configured provisioned throughput for the index was exceeded")
                .build(),
        );

        let mapped = map_query_error(SdkError::service_error(service_error, ()));

        match mapped {
            RepositoryError::StorageFailed(message) => {
                assert!(message.starts_with("Query failed: throughput exceeded: "), "{message}");
                assert!(
                    message.contains(
                        "The level of configured provisioned throughput for the index was exceeded"
                    ),
                    "{message}"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_conditional_check_on_update_is_not_found() {
        let service_error = UpdateItemError::ConditionalCheckFailedException(
            ConditionalCheckFailedException::builder()
                .message("The conditional request failed")
                .build(),
        );
        let key = RecordKey::new("108", "urn:uuid:3113101A18414AF9E0635220010A8E86");

        let mapped = map_update_item_error(SdkError::service_error(service_error, ()), &key);

        assert_eq!(
            mapped,
            RepositoryError::NotFound {
                entity_type: "Record",
                id: key.to_string(),
            }
        );
    }
}
