//! Seed the records table with mock feed records.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::{AttributeValue, PutRequest, WriteRequest};
use aws_sdk_dynamodb::Client;
use feedrecords_core::record::{attr, Record};
use feedrecords_core::serde::format_timestamp;

use super::error::{DynamodbError, Result};

/// BatchWriteItem accepts at most 25 requests.
const BATCH_SIZE: usize = 25;

type Item = HashMap<String, AttributeValue>;

fn string(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

/// Converts a record into the item layout the server reads back.
pub fn record_to_item(record: &Record) -> Item {
    HashMap::from([
        (attr::PERSON_ID.to_string(), string(&record.person_id)),
        (attr::ENTRY_ID.to_string(), string(&record.entry_id)),
        (attr::FEED.to_string(), string(&record.feed)),
        (
            attr::DML_OPERATION.to_string(),
            string(record.dml_operation.as_str()),
        ),
        (
            attr::IS_PROCESSED.to_string(),
            AttributeValue::Bool(record.is_processed),
        ),
        (attr::WORKER_TYPE.to_string(), string(&record.worker_type)),
        (
            attr::PROCESSED_MESSAGE.to_string(),
            string(&record.processed_message),
        ),
        (attr::CONSTANT_KEY.to_string(), string(&record.constant_key)),
        (
            attr::PUBLISHED_DATE_TIME.to_string(),
            string(&format_timestamp(&record.published_date_time)),
        ),
        (
            attr::UPDATED_DATE_TIME.to_string(),
            string(&format_timestamp(&record.updated_date_time)),
        ),
    ])
}

/// One-line summary used when previewing the seed.
pub fn describe_record(record: &Record) -> String {
    format!(
        "{} - person {} {} {} ({})",
        format_timestamp(&record.published_date_time),
        record.person_id,
        record.feed,
        record.dml_operation,
        if record.is_processed {
            "processed"
        } else {
            "pending"
        }
    )
}

/// Writes the records in batches and returns how many were stored.
///
/// Items DynamoDB reports back as unprocessed fail the seed.
pub async fn seed_records(client: &Client, table_name: &str, records: &[Record]) -> Result<usize> {
    let mut inserted = 0;

    for chunk in records.chunks(BATCH_SIZE) {
        let write_requests = chunk
            .iter()
            .map(|record| {
                let put = PutRequest::builder()
                    .set_item(Some(record_to_item(record)))
                    .build()
                    .map_err(DynamodbError::sdk)?;
                Ok(WriteRequest::builder().put_request(put).build())
            })
            .collect::<Result<Vec<_>>>()?;

        let output = client
            .batch_write_item()
            .request_items(table_name, write_requests)
            .send()
            .await
            .map_err(DynamodbError::sdk)?;

        let unprocessed: usize = output
            .unprocessed_items()
            .map(|items| items.values().map(Vec::len).sum())
            .unwrap_or_default();
        if unprocessed > 0 {
            return Err(DynamodbError::UnprocessedItems { count: unprocessed });
        }

        inserted += chunk.len();
    }

    Ok(inserted)
}
