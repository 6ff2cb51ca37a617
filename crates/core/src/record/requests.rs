//! API request types for record operations.
//!
//! Every field is optional at the serde level so that a missing field turns
//! into a [`ValidationError`] naming it, rather than an opaque parse error.
//! Unknown fields are rejected at deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry_id::{generate_entry_id, is_valid_entry_id};
use super::error::ValidationError;
use super::types::{DmlOperation, Record, RecordKey, CONSTANT_KEY_VALUE};

fn required_string(
    value: Option<String>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field)),
    }
}

/// Request payload for creating a record (POST /api/records).
///
/// `ConstantKey`, `PublishedDateTime` and `UpdatedDateTime` are server
/// managed; supplying them is an unknown-field error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CreateRecordRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feed: Option<String>,
    #[serde(
        rename = "DMLOperation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dml_operation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_processed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_message: Option<String>,
}

impl CreateRecordRequest {
    /// Create a request with every required field set.
    pub fn new(
        person_id: impl Into<String>,
        feed: impl Into<String>,
        dml_operation: DmlOperation,
        is_processed: bool,
        worker_type: impl Into<String>,
        processed_message: impl Into<String>,
    ) -> Self {
        Self {
            person_id: Some(person_id.into()),
            entry_id: None,
            feed: Some(feed.into()),
            dml_operation: Some(dml_operation.as_str().to_string()),
            is_processed: Some(is_processed),
            worker_type: Some(worker_type.into()),
            processed_message: Some(processed_message.into()),
        }
    }

    /// Use a caller-supplied entry id instead of a generated one.
    pub fn with_entry_id(mut self, entry_id: impl Into<String>) -> Self {
        self.entry_id = Some(entry_id.into());
        self
    }

    /// Check required fields and formats.
    ///
    /// `IsProcessed: false` counts as present; only an absent value fails.
    pub fn validate(self) -> Result<NewRecord, ValidationError> {
        let person_id = required_string(self.person_id, "PersonId")?;
        let feed = required_string(self.feed, "Feed")?;
        let dml_operation = required_string(self.dml_operation, "DMLOperation")?
            .parse::<DmlOperation>()
            .map_err(ValidationError::InvalidDmlOperation)?;
        let is_processed = self
            .is_processed
            .ok_or(ValidationError::MissingField("IsProcessed"))?;
        let worker_type = required_string(self.worker_type, "WorkerType")?;
        let processed_message = required_string(self.processed_message, "ProcessedMessage")?;

        if let Some(entry_id) = &self.entry_id {
            if !is_valid_entry_id(entry_id) {
                return Err(ValidationError::InvalidEntryId { field: "EntryId" });
            }
        }

        Ok(NewRecord {
            person_id,
            entry_id: self.entry_id,
            feed,
            dml_operation,
            is_processed,
            worker_type,
            processed_message,
        })
    }
}

/// A validated create request, not yet materialized into a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub person_id: String,
    pub entry_id: Option<String>,
    pub feed: String,
    pub dml_operation: DmlOperation,
    pub is_processed: bool,
    pub worker_type: String,
    pub processed_message: String,
}

impl NewRecord {
    /// Materialize the full record.
    ///
    /// Both timestamps are set to `now`; the entry id is the caller's or a
    /// freshly generated one.
    pub fn materialize(self, now: DateTime<Utc>) -> Record {
        Record {
            person_id: self.person_id,
            entry_id: self.entry_id.unwrap_or_else(generate_entry_id),
            feed: self.feed,
            dml_operation: self.dml_operation,
            is_processed: self.is_processed,
            worker_type: self.worker_type,
            processed_message: self.processed_message,
            constant_key: CONSTANT_KEY_VALUE.to_string(),
            published_date_time: now,
            updated_date_time: now,
        }
    }
}

/// `{personId, entryId}` pair identifying a record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecordKeyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
}

impl RecordKeyRequest {
    pub fn new(person_id: impl Into<String>, entry_id: impl Into<String>) -> Self {
        Self {
            person_id: Some(person_id.into()),
            entry_id: Some(entry_id.into()),
        }
    }

    pub fn validate(self) -> Result<RecordKey, ValidationError> {
        let person_id = required_string(self.person_id, "personId")?;
        let entry_id = required_string(self.entry_id, "entryId")?;
        if !is_valid_entry_id(&entry_id) {
            return Err(ValidationError::InvalidEntryId { field: "entryId" });
        }
        Ok(RecordKey::new(person_id, entry_id))
    }
}

/// Request payload for DELETE /api/records.
pub type DeleteRecordRequest = RecordKeyRequest;

/// Request payload for DELETE /api/records/batchdelete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BatchDeleteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<RecordKeyRequest>>,
}

impl BatchDeleteRequest {
    pub fn new(records: Vec<RecordKeyRequest>) -> Self {
        Self {
            records: Some(records),
        }
    }

    /// Validate every entry; the whole batch fails on the first bad one.
    pub fn validate(self) -> Result<Vec<RecordKey>, ValidationError> {
        let records = self
            .records
            .ok_or(ValidationError::MissingField("records"))?;
        if records.is_empty() {
            return Err(ValidationError::EmptyBatch);
        }

        records
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                record
                    .validate()
                    .map_err(|source| ValidationError::InvalidBatchEntry {
                        index,
                        source: Box::new(source),
                    })
            })
            .collect()
    }
}

/// Request payload for PATCH /api/records/processed-status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProcessedStatusRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_processed: Option<bool>,
}

impl UpdateProcessedStatusRequest {
    pub fn new(
        person_id: impl Into<String>,
        entry_id: impl Into<String>,
        is_processed: bool,
    ) -> Self {
        Self {
            person_id: Some(person_id.into()),
            entry_id: Some(entry_id.into()),
            is_processed: Some(is_processed),
        }
    }

    pub fn validate(self) -> Result<(RecordKey, bool), ValidationError> {
        let key = RecordKeyRequest {
            person_id: self.person_id,
            entry_id: self.entry_id,
        }
        .validate()?;
        let is_processed = self
            .is_processed
            .ok_or(ValidationError::MissingField("isProcessed"))?;
        Ok((key, is_processed))
    }
}

/// Query parameters for GET /api/records/search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub person_id: Option<String>,
}

impl SearchQuery {
    /// Returns the trimmed person id to match exactly.
    pub fn validate(self) -> Result<String, ValidationError> {
        required_string(self.person_id, "personId").map(|p| p.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const ENTRY_ID: &str = "urn:uuid:3113101A18414AF9E0635220010A8E86";

    fn valid_request() -> CreateRecordRequest {
        CreateRecordRequest::new(
            "108",
            "empassignment",
            DmlOperation::Insert,
            false,
            "EMP",
            "Initial record creation",
        )
    }

    #[test]
    fn test_valid_create_request() {
        let new_record = valid_request().validate().unwrap();
        assert_eq!(new_record.person_id, "108");
        assert_eq!(new_record.dml_operation, DmlOperation::Insert);
        assert!(!new_record.is_processed);
        assert_eq!(new_record.entry_id, None);
    }

    #[test]
    fn test_is_processed_false_is_present() {
        let json = r#"{
            "PersonId": "108",
            "Feed": "empassignment",
            "DMLOperation": "UPDATE",
            "IsProcessed": false,
            "WorkerType": "EMP",
            "ProcessedMessage": "ok"
        }"#;
        let request: CreateRecordRequest = serde_json::from_str(json).unwrap();
        let new_record = request.validate().unwrap();
        assert!(!new_record.is_processed);
    }

    #[test]
    fn test_each_required_field_is_enforced() {
        let cases: Vec<(&str, fn(&mut CreateRecordRequest))> = vec![
            ("PersonId", |r| r.person_id = None),
            ("Feed", |r| r.feed = None),
            ("DMLOperation", |r| r.dml_operation = None),
            ("IsProcessed", |r| r.is_processed = None),
            ("WorkerType", |r| r.worker_type = None),
            ("ProcessedMessage", |r| r.processed_message = None),
        ];

        for (field, strip) in cases {
            let mut request = valid_request();
            strip(&mut request);
            assert_eq!(
                request.validate(),
                Err(ValidationError::MissingField(field)),
                "missing {field} should fail"
            );
        }
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let mut request = valid_request();
        request.feed = Some("  ".to_string());
        assert_eq!(
            request.validate(),
            Err(ValidationError::MissingField("Feed"))
        );
    }

    #[test]
    fn test_invalid_dml_operation() {
        let mut request = valid_request();
        request.dml_operation = Some("MERGE".to_string());
        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidDmlOperation(_))
        ));
    }

    #[test]
    fn test_supplied_entry_id_must_match_format() {
        let request = valid_request().with_entry_id("3113101A18414AF9E0635220010A8E86");
        assert_eq!(
            request.validate(),
            Err(ValidationError::InvalidEntryId { field: "EntryId" })
        );

        let request = valid_request().with_entry_id(ENTRY_ID);
        assert_eq!(request.validate().unwrap().entry_id.as_deref(), Some(ENTRY_ID));
    }

    #[test]
    fn test_unknown_and_server_managed_fields_are_rejected() {
        let json = r#"{"PersonId": "108", "Color": "blue"}"#;
        assert!(serde_json::from_str::<CreateRecordRequest>(json).is_err());

        let json = r#"{"PersonId": "108", "ConstantKey": "Constant"}"#;
        assert!(serde_json::from_str::<CreateRecordRequest>(json).is_err());

        let json = r#"{"PersonId": "108", "PublishedDateTime": "2024-01-01T00:00:00.000Z"}"#;
        assert!(serde_json::from_str::<CreateRecordRequest>(json).is_err());
    }

    #[test]
    fn test_non_boolean_is_processed_is_rejected() {
        let json = r#"{"IsProcessed": "false"}"#;
        assert!(serde_json::from_str::<CreateRecordRequest>(json).is_err());
    }

    #[test]
    fn test_materialize_sets_server_fields() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let record = valid_request().validate().unwrap().materialize(now);

        assert_eq!(record.constant_key, "Constant");
        assert_eq!(record.published_date_time, now);
        assert_eq!(record.updated_date_time, now);
        assert!(is_valid_entry_id(&record.entry_id));
    }

    #[test]
    fn test_materialize_keeps_supplied_entry_id() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let record = valid_request()
            .with_entry_id(ENTRY_ID)
            .validate()
            .unwrap()
            .materialize(now);
        assert_eq!(record.entry_id, ENTRY_ID);
    }

    #[test]
    fn test_record_key_request_validation() {
        assert_eq!(
            RecordKeyRequest::new("108", ENTRY_ID).validate(),
            Ok(RecordKey::new("108", ENTRY_ID))
        );

        let missing = RecordKeyRequest {
            person_id: Some("108".to_string()),
            entry_id: None,
        };
        assert_eq!(
            missing.validate(),
            Err(ValidationError::MissingField("entryId"))
        );

        assert_eq!(
            RecordKeyRequest::new("108", "not-an-entry-id").validate(),
            Err(ValidationError::InvalidEntryId { field: "entryId" })
        );
    }

    #[test]
    fn test_batch_delete_rejects_whole_batch_on_bad_entry() {
        let request = BatchDeleteRequest::new(vec![
            RecordKeyRequest::new("1", ENTRY_ID),
            RecordKeyRequest {
                person_id: None,
                entry_id: Some(ENTRY_ID.to_string()),
            },
        ]);

        assert_eq!(
            request.validate(),
            Err(ValidationError::InvalidBatchEntry {
                index: 1,
                source: Box::new(ValidationError::MissingField("personId")),
            })
        );
    }

    #[test]
    fn test_batch_delete_requires_records() {
        assert_eq!(
            BatchDeleteRequest::default().validate(),
            Err(ValidationError::MissingField("records"))
        );
        assert_eq!(
            BatchDeleteRequest::new(vec![]).validate(),
            Err(ValidationError::EmptyBatch)
        );
    }

    #[test]
    fn test_batch_delete_request_wire_format() {
        let json = format!(r#"{{"records": [{{"personId": "1", "entryId": "{ENTRY_ID}"}}]}}"#);
        let request: BatchDeleteRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.validate().unwrap(), vec![RecordKey::new("1", ENTRY_ID)]);
    }

    #[test]
    fn test_update_processed_status_validation() {
        let (key, is_processed) = UpdateProcessedStatusRequest::new("108", ENTRY_ID, true)
            .validate()
            .unwrap();
        assert_eq!(key, RecordKey::new("108", ENTRY_ID));
        assert!(is_processed);

        let missing_flag = UpdateProcessedStatusRequest {
            is_processed: None,
            ..UpdateProcessedStatusRequest::new("108", ENTRY_ID, true)
        };
        assert_eq!(
            missing_flag.validate(),
            Err(ValidationError::MissingField("isProcessed"))
        );
    }

    #[test]
    fn test_search_query_trims_person_id() {
        let query = SearchQuery {
            person_id: Some("  108 ".to_string()),
        };
        assert_eq!(query.validate(), Ok("108".to_string()));

        assert_eq!(
            SearchQuery::default().validate(),
            Err(ValidationError::MissingField("personId"))
        );
    }
}
