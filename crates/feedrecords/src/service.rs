//! Record service: CRUD operations and listings over a [`RecordStore`].
//!
//! The service validates requests, stamps server-managed fields, drives the
//! pagination engine from `feedrecords_core::pagination` and logs every
//! store interaction. Store errors are logged and returned unchanged.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use feedrecords_core::pagination::{
    decode_token, filtered_page, sorted_page, Page, PageKey, PageLimit, PublishedIndexQuery,
    RecordFilter, BATCH_DELETE_CHUNK_SIZE,
};
use feedrecords_core::record::{
    BatchDeleteRequest, CreateRecordRequest, DeleteRecordRequest, Record, SearchQuery,
    UpdateProcessedStatusRequest,
};
use feedrecords_core::storage::{RecordStore, RepositoryError, Result};

/// Source of the current time for server-managed timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

fn decode_optional_token(token: Option<&str>) -> Result<Option<PageKey>> {
    token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(decode_token)
        .transpose()
        .map_err(RepositoryError::from)
}

#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Validates and writes a new record; returns the full stored record.
    pub async fn create_record(&self, request: CreateRecordRequest) -> Result<Record> {
        tracing::debug!(person_id = ?request.person_id, "Creating record");

        let new_record = request.validate().inspect_err(|e| {
            tracing::warn!(error = %e, "Rejected create request");
        })?;
        let record = new_record.materialize(self.clock.now());

        self.store.put_record(&record).await.inspect_err(|e| {
            tracing::error!(key = %record.key(), error = %e, "Failed to create record");
        })?;

        tracing::info!(
            person_id = %record.person_id,
            entry_id = %record.entry_id,
            "Created record"
        );
        Ok(record)
    }

    /// Lists records newest first.
    pub async fn list_records(
        &self,
        limit: PageLimit,
        next_token: Option<&str>,
    ) -> Result<Page<Record>> {
        tracing::debug!(limit = limit.get(), has_token = next_token.is_some(), "Listing records");

        let start = decode_optional_token(next_token)?;
        let query = PublishedIndexQuery::sorted(limit, start);

        let output = self
            .store
            .query_published_index(&query)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to list records"))?;

        let page = sorted_page(output);
        tracing::info!(
            count = page.count,
            has_more = page.next_token.is_some(),
            "Listed records"
        );
        Ok(page)
    }

    /// Lists records newest first, keeping only those matching `filter`.
    ///
    /// Runs a single over-fetched query. A page may hold fewer than `limit`
    /// items while still carrying a `nextToken` when the filter is very
    /// selective.
    pub async fn list_filtered_records(
        &self,
        filter: RecordFilter,
        limit: PageLimit,
        next_token: Option<&str>,
    ) -> Result<Page<Record>> {
        tracing::debug!(
            ?filter,
            unfiltered = filter.is_empty(),
            limit = limit.get(),
            has_token = next_token.is_some(),
            "Listing filtered records"
        );

        let start = decode_optional_token(next_token)?;
        let query = PublishedIndexQuery::filtered(limit, start, filter);

        let output = self
            .store
            .query_published_index(&query)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to list filtered records"))?;

        let scanned_matches = output.items.len();
        let page = filtered_page(output, limit);
        tracing::info!(
            count = page.count,
            scanned_matches,
            has_more = page.next_token.is_some(),
            "Listed filtered records"
        );
        Ok(page)
    }

    /// Deletes one record. Deleting a missing record succeeds.
    pub async fn delete_record(&self, request: DeleteRecordRequest) -> Result<()> {
        let key = request.validate()?;
        tracing::debug!(%key, "Deleting record");

        self.store
            .delete_record(&key)
            .await
            .inspect_err(|e| tracing::error!(%key, error = %e, "Failed to delete record"))?;

        tracing::info!(%key, "Deleted record");
        Ok(())
    }

    /// Deletes records in sequential chunks of [`BATCH_DELETE_CHUNK_SIZE`].
    ///
    /// The first failing chunk stops the batch; earlier chunks stay deleted.
    /// Returns the number of records requested for deletion.
    pub async fn batch_delete_records(&self, request: BatchDeleteRequest) -> Result<usize> {
        let keys = request.validate()?;
        tracing::debug!(count = keys.len(), "Batch deleting records");

        for (index, chunk) in keys.chunks(BATCH_DELETE_CHUNK_SIZE).enumerate() {
            self.store
                .batch_delete_records(chunk)
                .await
                .inspect_err(|e| {
                    tracing::error!(
                        chunk = index,
                        chunk_size = chunk.len(),
                        error = %e,
                        "Failed to batch delete records"
                    );
                })?;
            tracing::debug!(chunk = index, chunk_size = chunk.len(), "Deleted chunk");
        }

        tracing::info!(count = keys.len(), "Batch deleted records");
        Ok(keys.len())
    }

    /// Sets `IsProcessed` on an existing record and returns the updated record.
    pub async fn update_processed_status(
        &self,
        request: UpdateProcessedStatusRequest,
    ) -> Result<Record> {
        let (key, is_processed) = request.validate()?;
        tracing::debug!(%key, is_processed, "Updating processed status");

        let updated = self
            .store
            .update_processed_status(&key, is_processed, self.clock.now())
            .await
            .inspect_err(|e| {
                tracing::error!(%key, error = %e, "Failed to update processed status");
            })?;

        match updated {
            Some(record) => {
                tracing::info!(%key, is_processed, "Updated processed status");
                Ok(record)
            }
            None => {
                tracing::warn!(%key, "Record not found for status update");
                Err(RepositoryError::NotFound {
                    entity_type: "Record",
                    id: key.to_string(),
                })
            }
        }
    }

    /// Returns every record whose `PersonId` equals the trimmed input.
    pub async fn search_by_person_id(&self, query: SearchQuery) -> Result<Vec<Record>> {
        let person_id = query.validate()?;
        tracing::debug!(%person_id, "Searching records");

        let records = self
            .store
            .scan_by_person_id(&person_id)
            .await
            .inspect_err(|e| tracing::error!(%person_id, error = %e, "Failed to search records"))?;

        tracing::info!(%person_id, count = records.len(), "Searched records");
        Ok(records)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use chrono::{Duration, TimeZone};
    use feedrecords_core::record::{
        is_valid_entry_id, DmlOperation, RecordKey, RecordKeyRequest,
    };

    use crate::storage::InMemoryRepository;

    /// Clock that advances by a fixed step on every reading.
    pub(crate) struct StepClock {
        next: Mutex<DateTime<Utc>>,
        step: Duration,
    }

    impl StepClock {
        pub(crate) fn new() -> Self {
            Self {
                next: Mutex::new(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
                step: Duration::seconds(1),
            }
        }
    }

    impl Clock for StepClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self.next.lock().unwrap();
            let now = *next;
            *next = now + self.step;
            now
        }
    }

    fn service() -> (RecordService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        let service = RecordService::new(Arc::new(repo.clone()), Arc::new(StepClock::new()));
        (service, repo)
    }

    fn create_request(person_id: &str, feed: &str) -> CreateRecordRequest {
        CreateRecordRequest::new(
            person_id,
            feed,
            DmlOperation::Insert,
            false,
            "EMP",
            "Initial record creation",
        )
    }

    async fn all_pages(service: &RecordService, limit: u32) -> Vec<Record> {
        let limit = PageLimit::new(limit).unwrap();
        let mut items = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = service.list_records(limit, token.as_deref()).await.unwrap();
            items.extend(page.items);
            match page.next_token {
                Some(t) => token = Some(t),
                None => break,
            }
        }
        items
    }

    async fn all_filtered_pages(
        service: &RecordService,
        filter: &RecordFilter,
        limit: u32,
    ) -> Vec<Record> {
        let limit = PageLimit::new(limit).unwrap();
        let mut items = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let page = service
                .list_filtered_records(filter.clone(), limit, token.as_deref())
                .await
                .unwrap();
            assert!(page.count <= limit.get() as usize);
            items.extend(page.items);
            match page.next_token {
                Some(t) => token = Some(t),
                None => break,
            }
        }
        items
    }

    #[tokio::test]
    async fn test_create_generates_entry_id_and_equal_timestamps() {
        let (service, repo) = service();

        let record = service
            .create_record(create_request("108", "empassignment"))
            .await
            .unwrap();

        assert!(is_valid_entry_id(&record.entry_id));
        assert_eq!(record.published_date_time, record.updated_date_time);
        assert_eq!(record.constant_key, "Constant");
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_create_uses_supplied_entry_id() {
        let (service, _) = service();
        let entry_id = "urn:uuid:3113101A18414AF9E0635220010A8E86";

        let record = service
            .create_record(create_request("108", "empassignment").with_entry_id(entry_id))
            .await
            .unwrap();

        assert_eq!(record.entry_id, entry_id);
    }

    #[tokio::test]
    async fn test_create_validation_writes_nothing() {
        let (service, repo) = service();

        let strips: Vec<fn(&mut CreateRecordRequest)> = vec![
            |r| r.person_id = None,
            |r| r.feed = None,
            |r| r.dml_operation = None,
            |r| r.is_processed = None,
            |r| r.worker_type = None,
            |r| r.processed_message = None,
        ];

        for strip in strips {
            let mut request = create_request("108", "empassignment");
            strip(&mut request);
            let result = service.create_record(request).await;
            assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
        }

        assert!(service
            .search_by_person_id(SearchQuery {
                person_id: Some("108".to_string())
            })
            .await
            .unwrap()
            .is_empty());
        assert_eq!(repo.len().await, 0);
    }

    #[tokio::test]
    async fn test_sorted_listing_pages_cover_everything_in_order() {
        let (service, _) = service();
        for i in 0..11 {
            service
                .create_record(create_request(&format!("{i}"), "empassignment"))
                .await
                .unwrap();
        }

        let items = all_pages(&service, 3).await;

        assert_eq!(items.len(), 11);
        assert!(items
            .windows(2)
            .all(|w| w[0].published_date_time >= w[1].published_date_time));
        let unique: HashSet<RecordKey> = items.iter().map(Record::key).collect();
        assert_eq!(unique.len(), 11);
    }

    #[tokio::test]
    async fn test_sorted_listing_short_table_has_no_token() {
        let (service, _) = service();
        for i in 0..2 {
            service
                .create_record(create_request(&format!("{i}"), "empassignment"))
                .await
                .unwrap();
        }

        let page = service
            .list_records(PageLimit::new(5).unwrap(), None)
            .await
            .unwrap();
        assert_eq!(page.count, 2);
        assert!(page.next_token.is_none());
    }

    #[tokio::test]
    async fn test_filtered_listing_compensates_for_heavy_exclusion() {
        let (service, _) = service();
        for i in 0..100 {
            let feed = if i == 65 || i == 80 { "salary" } else { "person" };
            service
                .create_record(create_request(&format!("{i}"), feed))
                .await
                .unwrap();
        }

        let filter = RecordFilter::from_raw(Some("salary"), None, None, None);
        let page = service
            .list_filtered_records(filter, PageLimit::new(2).unwrap(), None)
            .await
            .unwrap();

        assert_eq!(page.count, 2);
        let people: Vec<&str> = page.items.iter().map(|r| r.person_id.as_str()).collect();
        assert_eq!(people, vec!["80", "65"]);
    }

    #[tokio::test]
    async fn test_filtered_listing_truncation_token_neither_skips_nor_repeats() {
        let (service, _) = service();
        for i in 0..20 {
            let feed = if i % 2 == 0 { "salary" } else { "person" };
            service
                .create_record(create_request(&format!("{i}"), feed))
                .await
                .unwrap();
        }

        let filter = RecordFilter::from_raw(Some("salary"), None, None, None);
        let unpaginated = service
            .list_filtered_records(filter.clone(), PageLimit::new(1000).unwrap(), None)
            .await
            .unwrap();
        assert_eq!(unpaginated.count, 10);

        let first = service
            .list_filtered_records(filter.clone(), PageLimit::new(3).unwrap(), None)
            .await
            .unwrap();
        assert_eq!(first.count, 3);
        assert!(first.next_token.is_some());

        let paged = all_filtered_pages(&service, &filter, 3).await;
        let paged_keys: Vec<RecordKey> = paged.iter().map(Record::key).collect();
        let expected_keys: Vec<RecordKey> = unpaginated.items.iter().map(Record::key).collect();
        assert_eq!(paged_keys, expected_keys);
    }

    #[tokio::test]
    async fn test_malformed_token_is_a_client_error() {
        let (service, _) = service();

        let result = service
            .list_records(PageLimit::default(), Some("not a token!"))
            .await;
        assert!(matches!(result, Err(RepositoryError::InvalidToken(_))));

        let result = service
            .list_filtered_records(RecordFilter::default(), PageLimit::default(), Some("e30="))
            .await;
        assert!(matches!(result, Err(RepositoryError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_update_status_of_missing_record_is_not_found() {
        let (service, _) = service();

        let result = service
            .update_processed_status(UpdateProcessedStatusRequest::new(
                "404",
                "urn:uuid:00000000000000000000000000000000",
                true,
            ))
            .await;

        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_status_bumps_updated_time_only() {
        let (service, _) = service();
        let created = service
            .create_record(create_request("108", "empassignment"))
            .await
            .unwrap();

        let updated = service
            .update_processed_status(UpdateProcessedStatusRequest::new(
                &created.person_id,
                &created.entry_id,
                true,
            ))
            .await
            .unwrap();

        assert!(updated.is_processed);
        assert_eq!(updated.published_date_time, created.published_date_time);
        assert!(updated.updated_date_time > created.updated_date_time);
        assert_eq!(updated.feed, created.feed);
    }

    #[tokio::test]
    async fn test_batch_delete_chunks_beyond_native_limit() {
        let (service, repo) = service();
        let mut keys = Vec::new();
        for i in 0..30 {
            let record = service
                .create_record(create_request(&format!("{i}"), "empassignment"))
                .await
                .unwrap();
            keys.push(RecordKeyRequest::new(record.person_id, record.entry_id));
        }

        let deleted = service
            .batch_delete_records(BatchDeleteRequest::new(keys))
            .await
            .unwrap();

        assert_eq!(deleted, 30);
        assert_eq!(repo.len().await, 0);
        assert!(all_pages(&service, 50).await.is_empty());
    }

    #[tokio::test]
    async fn test_batch_delete_rejects_invalid_entry_before_deleting() {
        let (service, repo) = service();
        let record = service
            .create_record(create_request("1", "empassignment"))
            .await
            .unwrap();

        let result = service
            .batch_delete_records(BatchDeleteRequest::new(vec![
                RecordKeyRequest::new(record.person_id.clone(), record.entry_id.clone()),
                RecordKeyRequest::new("2", "bad"),
            ]))
            .await;

        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_missing_record_succeeds() {
        let (service, _) = service();

        let result = service
            .delete_record(RecordKeyRequest::new(
                "nobody",
                "urn:uuid:00000000000000000000000000000000",
            ))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let (service, repo) = service();
        let record = service
            .create_record(create_request("1", "empassignment"))
            .await
            .unwrap();

        service
            .delete_record(RecordKeyRequest::new(record.person_id, record.entry_id))
            .await
            .unwrap();

        assert_eq!(repo.len().await, 0);
    }

    #[tokio::test]
    async fn test_search_is_exact_match_on_trimmed_input() {
        let (service, _) = service();
        for person_id in ["108", "1080", "108x", "108"] {
            service
                .create_record(create_request(person_id, "empassignment"))
                .await
                .unwrap();
        }

        let found = service
            .search_by_person_id(SearchQuery {
                person_id: Some(" 108 ".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.person_id == "108"));
    }

    #[tokio::test]
    async fn test_search_requires_person_id() {
        let (service, _) = service();
        let result = service.search_by_person_id(SearchQuery::default()).await;
        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }
}
