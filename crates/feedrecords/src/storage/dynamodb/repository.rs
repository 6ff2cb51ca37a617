//! DynamoDB repository implementation.
//!
//! Implements [`RecordStore`] from `feedrecords_core::storage` using DynamoDB.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, DeleteRequest, ReturnValue, WriteRequest};
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};

use feedrecords_core::pagination::{PublishedIndexQuery, QueryOutput};
use feedrecords_core::record::{attr, Record, RecordKey, CONSTANT_KEY_VALUE, PUBLISHED_INDEX};
use feedrecords_core::serde::format_timestamp;
use feedrecords_core::storage::{RecordStore, RepositoryError, Result};

use super::conversions::{
    filter_value_to_attribute, item_to_page_key, item_to_record, key_to_item, page_key_to_item,
    record_to_item,
};
use super::error::{
    map_batch_write_item_error, map_delete_item_error, map_put_item_error, map_query_error,
    map_scan_error, map_update_item_error,
};

/// DynamoDB-based record store.
pub struct DynamoDbRepository {
    client: Client,
    table_name: String,
}

impl DynamoDbRepository {
    /// Creates a new repository with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a repository using the default credential chain.
    ///
    /// `endpoint_url` points the client at a local DynamoDB when set.
    pub async fn connect(
        region: &str,
        endpoint_url: Option<&str>,
        table_name: impl Into<String>,
    ) -> Self {
        let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()));

        if let Some(endpoint) = endpoint_url {
            sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
        }

        let sdk_config = sdk_config_loader.load().await;
        Self::new(Client::new(&sdk_config), table_name)
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl RecordStore for DynamoDbRepository {
    async fn put_record(&self, record: &Record) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(record)))
            .send()
            .await
            .map_err(map_put_item_error)?;

        Ok(())
    }

    async fn query_published_index(&self, query: &PublishedIndexQuery) -> Result<QueryOutput> {
        let mut request = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(PUBLISHED_INDEX)
            .key_condition_expression(format!("{} = :ck", attr::CONSTANT_KEY))
            .expression_attribute_values(":ck", AttributeValue::S(CONSTANT_KEY_VALUE.to_string()))
            .scan_index_forward(false)
            .limit(i32::try_from(query.limit).unwrap_or(i32::MAX))
            .set_exclusive_start_key(query.exclusive_start_key.as_ref().map(page_key_to_item));

        if let Some(filter) = query.filter.to_expression() {
            request = request.filter_expression(filter.expression);
            for (placeholder, value) in filter.values {
                request =
                    request.expression_attribute_values(placeholder, filter_value_to_attribute(value));
            }
        }

        let output = request.send().await.map_err(map_query_error)?;

        let items = output
            .items
            .unwrap_or_default()
            .iter()
            .map(item_to_record)
            .collect::<Result<Vec<_>>>()?;

        let last_evaluated_key = output
            .last_evaluated_key
            .filter(|key| !key.is_empty())
            .map(|key| item_to_page_key(&key))
            .transpose()?;

        Ok(QueryOutput {
            items,
            last_evaluated_key,
        })
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_item(key)))
            .send()
            .await
            .map_err(map_delete_item_error)?;

        Ok(())
    }

    async fn batch_delete_records(&self, keys: &[RecordKey]) -> Result<()> {
        let requests = keys
            .iter()
            .map(|key| {
                DeleteRequest::builder()
                    .set_key(Some(key_to_item(key)))
                    .build()
                    .map(|delete| WriteRequest::builder().delete_request(delete).build())
                    .map_err(|e| RepositoryError::StorageFailed(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let output = self
            .client
            .batch_write_item()
            .request_items(&self.table_name, requests)
            .send()
            .await
            .map_err(map_batch_write_item_error)?;

        let unprocessed: usize = output
            .unprocessed_items
            .unwrap_or_default()
            .values()
            .map(Vec::len)
            .sum();

        if unprocessed > 0 {
            return Err(RepositoryError::StorageFailed(format!(
                "{} of {} delete requests were not processed",
                unprocessed,
                keys.len()
            )));
        }

        Ok(())
    }

    async fn update_processed_status(
        &self,
        key: &RecordKey,
        is_processed: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Record>> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(key_to_item(key)))
            .update_expression(format!(
                "SET {} = :isProcessed, {} = :updatedAt",
                attr::IS_PROCESSED,
                attr::UPDATED_DATE_TIME
            ))
            .condition_expression(format!("attribute_exists({})", attr::PERSON_ID))
            .expression_attribute_values(":isProcessed", AttributeValue::Bool(is_processed))
            .expression_attribute_values(
                ":updatedAt",
                AttributeValue::S(format_timestamp(&updated_at)),
            )
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(err) => {
                return match map_update_item_error(err, key) {
                    RepositoryError::NotFound { .. } => Ok(None),
                    other => Err(other),
                }
            }
        };

        output
            .attributes
            .filter(|attributes| !attributes.is_empty())
            .map(|attributes| item_to_record(&attributes))
            .transpose()
    }

    async fn scan_by_person_id(&self, person_id: &str) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut exclusive_start_key = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .filter_expression(format!("{} = :personId", attr::PERSON_ID))
                .expression_attribute_values(":personId", AttributeValue::S(person_id.to_string()))
                .set_exclusive_start_key(exclusive_start_key)
                .send()
                .await
                .map_err(map_scan_error)?;

            for item in output.items.unwrap_or_default() {
                records.push(item_to_record(&item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                _ => break,
            }
        }

        Ok(records)
    }
}
