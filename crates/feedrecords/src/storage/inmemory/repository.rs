//! In-memory repository implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use feedrecords_core::pagination::{
    PageKey, PublishedIndexQuery, QueryOutput, BATCH_DELETE_CHUNK_SIZE,
};
use feedrecords_core::record::{attr, Record, RecordKey};
use feedrecords_core::serde::format_timestamp;
use feedrecords_core::storage::{RecordStore, RepositoryError, Result};

/// Position of an item on the published index.
///
/// Ties on `PublishedDateTime` are broken by the table key so that paging
/// is deterministic.
type IndexPosition = (String, String, String);

fn position_of(record: &Record) -> IndexPosition {
    (
        format_timestamp(&record.published_date_time),
        record.person_id.clone(),
        record.entry_id.clone(),
    )
}

/// A start key without table attributes resumes after every item sharing
/// its `PublishedDateTime`.
fn position_of_key(key: &PageKey) -> IndexPosition {
    let get = |name: &str| key.get(name).unwrap_or_default().to_string();
    (
        get(attr::PUBLISHED_DATE_TIME),
        get(attr::PERSON_ID),
        get(attr::ENTRY_ID),
    )
}

/// In-memory storage backend for testing.
///
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<RwLock<BTreeMap<RecordKey, Record>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `records`.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let map = records.into_iter().map(|r| (r.key(), r)).collect();
        Self {
            records: Arc::new(RwLock::new(map)),
        }
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRepository {
    async fn put_record(&self, record: &Record) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(record.key(), record.clone());
        Ok(())
    }

    async fn query_published_index(&self, query: &PublishedIndexQuery) -> Result<QueryOutput> {
        let records = self.records.read().await;

        let mut ordered: Vec<(IndexPosition, &Record)> =
            records.values().map(|r| (position_of(r), r)).collect();
        ordered.sort_by(|a, b| b.0.cmp(&a.0));

        let remaining: Vec<&Record> = match &query.exclusive_start_key {
            Some(key) => {
                let start = position_of_key(key);
                ordered
                    .into_iter()
                    .filter(|(position, _)| *position < start)
                    .map(|(_, r)| r)
                    .collect()
            }
            None => ordered.into_iter().map(|(_, r)| r).collect(),
        };

        let limit = query.limit as usize;
        let evaluated = &remaining[..remaining.len().min(limit)];

        let last_evaluated_key = if remaining.len() > limit {
            evaluated.last().map(|r| PageKey::for_record(r))
        } else {
            None
        };

        let items = evaluated
            .iter()
            .filter(|r| query.filter.matches(r))
            .map(|r| (*r).clone())
            .collect();

        Ok(QueryOutput {
            items,
            last_evaluated_key,
        })
    }

    async fn delete_record(&self, key: &RecordKey) -> Result<()> {
        let mut records = self.records.write().await;
        records.remove(key);
        Ok(())
    }

    async fn batch_delete_records(&self, keys: &[RecordKey]) -> Result<()> {
        if keys.len() > BATCH_DELETE_CHUNK_SIZE {
            return Err(RepositoryError::StorageFailed(format!(
                "Too many items requested for the BatchWriteItem call: {} (max {})",
                keys.len(),
                BATCH_DELETE_CHUNK_SIZE
            )));
        }

        let mut records = self.records.write().await;
        for key in keys {
            records.remove(key);
        }
        Ok(())
    }

    async fn update_processed_status(
        &self,
        key: &RecordKey,
        is_processed: bool,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Record>> {
        let mut records = self.records.write().await;
        Ok(records.get_mut(key).map(|record| {
            record.set_processed(is_processed, updated_at);
            record.clone()
        }))
    }

    async fn scan_by_person_id(&self, person_id: &str) -> Result<Vec<Record>> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .filter(|r| r.person_id == person_id)
            .cloned()
            .collect())
    }
}
