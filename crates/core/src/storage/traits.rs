use async_trait::async_trait;

use crate::pagination::{PublishedIndexQuery, QueryOutput};
use crate::record::{Record, RecordKey};

use super::Result;

/// The key-value store contract the record service is written against.
///
/// Implementations preserve the store's native semantics: puts overwrite,
/// deletes of missing keys succeed, and a query's limit applies before its
/// filter.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Writes a complete record, replacing any record with the same key.
    async fn put_record(&self, record: &Record) -> Result<()>;

    /// Runs one descending query on the published index.
    async fn query_published_index(&self, query: &PublishedIndexQuery) -> Result<QueryOutput>;

    /// Deletes a record by key. Missing keys are not an error.
    async fn delete_record(&self, key: &RecordKey) -> Result<()>;

    /// Deletes up to [`BATCH_DELETE_CHUNK_SIZE`](crate::pagination::BATCH_DELETE_CHUNK_SIZE)
    /// records in one batch write.
    async fn batch_delete_records(&self, keys: &[RecordKey]) -> Result<()>;

    /// Sets `IsProcessed` and `UpdatedDateTime` on an existing record.
    ///
    /// Returns the updated record, or `None` when no record has `key`.
    async fn update_processed_status(
        &self,
        key: &RecordKey,
        is_processed: bool,
        updated_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Option<Record>>;

    /// Full scan for records whose `PersonId` equals `person_id` exactly.
    async fn scan_by_person_id(&self, person_id: &str) -> Result<Vec<Record>>;
}
