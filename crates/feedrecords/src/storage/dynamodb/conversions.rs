//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and domain types.
//! These are testable in isolation without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use feedrecords_core::pagination::{FilterValue, PageKey};
use feedrecords_core::record::{attr, DmlOperation, Record, RecordKey};
use feedrecords_core::serde::{format_timestamp, parse_timestamp};
use feedrecords_core::storage::RepositoryError;

pub type Item = HashMap<String, AttributeValue>;

/// Convert a Record to a DynamoDB item.
pub fn record_to_item(record: &Record) -> Item {
    let mut item = key_to_item(&record.key());

    item.insert(attr::FEED.to_string(), AttributeValue::S(record.feed.clone()));
    item.insert(
        attr::DML_OPERATION.to_string(),
        AttributeValue::S(record.dml_operation.as_str().to_string()),
    );
    item.insert(
        attr::IS_PROCESSED.to_string(),
        AttributeValue::Bool(record.is_processed),
    );
    item.insert(
        attr::WORKER_TYPE.to_string(),
        AttributeValue::S(record.worker_type.clone()),
    );
    item.insert(
        attr::PROCESSED_MESSAGE.to_string(),
        AttributeValue::S(record.processed_message.clone()),
    );
    item.insert(
        attr::CONSTANT_KEY.to_string(),
        AttributeValue::S(record.constant_key.clone()),
    );
    item.insert(
        attr::PUBLISHED_DATE_TIME.to_string(),
        AttributeValue::S(format_timestamp(&record.published_date_time)),
    );
    item.insert(
        attr::UPDATED_DATE_TIME.to_string(),
        AttributeValue::S(format_timestamp(&record.updated_date_time)),
    );

    item
}

/// Convert a DynamoDB item to a Record.
pub fn item_to_record(item: &Item) -> Result<Record, RepositoryError> {
    let dml_operation = get_string(item, attr::DML_OPERATION)?
        .parse::<DmlOperation>()
        .map_err(RepositoryError::Serialization)?;

    Ok(Record {
        person_id: get_string(item, attr::PERSON_ID)?,
        entry_id: get_string(item, attr::ENTRY_ID)?,
        feed: get_string(item, attr::FEED)?,
        dml_operation,
        is_processed: get_bool(item, attr::IS_PROCESSED)?,
        worker_type: get_string(item, attr::WORKER_TYPE)?,
        processed_message: get_string(item, attr::PROCESSED_MESSAGE)?,
        constant_key: get_string(item, attr::CONSTANT_KEY)?,
        published_date_time: get_datetime(item, attr::PUBLISHED_DATE_TIME)?,
        updated_date_time: get_datetime(item, attr::UPDATED_DATE_TIME)?,
    })
}

/// Primary key attributes of a record.
pub fn key_to_item(key: &RecordKey) -> Item {
    HashMap::from([
        (
            attr::PERSON_ID.to_string(),
            AttributeValue::S(key.person_id.clone()),
        ),
        (
            attr::ENTRY_ID.to_string(),
            AttributeValue::S(key.entry_id.clone()),
        ),
    ])
}

/// Convert a page key to an `ExclusiveStartKey`.
pub fn page_key_to_item(key: &PageKey) -> Item {
    key.iter()
        .map(|(name, value)| (name.to_string(), AttributeValue::S(value.to_string())))
        .collect()
}

/// Convert a `LastEvaluatedKey` to a page key.
///
/// Every key attribute of the table and the published index is a string.
pub fn item_to_page_key(item: &Item) -> Result<PageKey, RepositoryError> {
    item.iter()
        .map(|(name, value)| {
            value
                .as_s()
                .map(|s| (name.clone(), s.clone()))
                .map_err(|_| {
                    RepositoryError::Serialization(format!("Non-string key attribute: {}", name))
                })
        })
        .collect()
}

/// Convert a filter placeholder value to an attribute value.
pub fn filter_value_to_attribute(value: FilterValue) -> AttributeValue {
    match value {
        FilterValue::String(s) => AttributeValue::S(s),
        FilterValue::Bool(b) => AttributeValue::Bool(b),
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn get_string(item: &Item, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            RepositoryError::Serialization(format!("Missing or invalid field: {}", key))
        })
}

fn get_bool(item: &Item, key: &str) -> Result<bool, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| {
            RepositoryError::Serialization(format!("Missing or invalid field: {}", key))
        })
}

fn get_datetime(item: &Item, key: &str) -> Result<DateTime<Utc>, RepositoryError> {
    let s = get_string(item, key)?;
    parse_timestamp(&s)
        .map_err(|e| RepositoryError::Serialization(format!("Invalid datetime {}: {}", key, e)))
}
