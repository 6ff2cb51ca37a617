use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::serde::iso_millis;

/// Fixed partition key value of the published index.
///
/// Every record carries it so the whole table lands in one index partition
/// and can be ordered globally by publication time.
pub const CONSTANT_KEY_VALUE: &str = "Constant";

/// Attribute names as stored in the table and its indexes.
pub mod attr {
    pub const PERSON_ID: &str = "PersonId";
    pub const ENTRY_ID: &str = "EntryId";
    pub const FEED: &str = "Feed";
    pub const DML_OPERATION: &str = "DMLOperation";
    pub const IS_PROCESSED: &str = "IsProcessed";
    pub const WORKER_TYPE: &str = "WorkerType";
    pub const PROCESSED_MESSAGE: &str = "ProcessedMessage";
    pub const CONSTANT_KEY: &str = "ConstantKey";
    pub const PUBLISHED_DATE_TIME: &str = "PublishedDateTime";
    pub const UPDATED_DATE_TIME: &str = "UpdatedDateTime";
}

/// Index ordering every record by `PublishedDateTime` under [`CONSTANT_KEY_VALUE`].
pub const PUBLISHED_INDEX: &str = "PublishedIndex";
/// Index ordering every record by `UpdatedDateTime` under [`CONSTANT_KEY_VALUE`].
pub const UPDATED_INDEX: &str = "UpdatedIndex";
/// Index for looking a record up by `EntryId` alone.
pub const ENTRY_INDEX: &str = "EntryIndex";

/// Data manipulation operation reported by an HCM integration event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DmlOperation {
    Insert,
    Update,
    Delete,
}

impl DmlOperation {
    /// Wire representation (`INSERT`, `UPDATE`, `DELETE`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DmlOperation::Insert => "INSERT",
            DmlOperation::Update => "UPDATE",
            DmlOperation::Delete => "DELETE",
        }
    }
}

impl fmt::Display for DmlOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DmlOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(DmlOperation::Insert),
            "UPDATE" => Ok(DmlOperation::Update),
            "DELETE" => Ok(DmlOperation::Delete),
            other => Err(format!(
                "DMLOperation must be one of INSERT, UPDATE, DELETE (got \"{other}\")"
            )),
        }
    }
}

/// Primary key of a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub person_id: String,
    pub entry_id: String,
}

impl RecordKey {
    pub fn new(person_id: impl Into<String>, entry_id: impl Into<String>) -> Self {
        Self {
            person_id: person_id.into(),
            entry_id: entry_id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.person_id, self.entry_id)
    }
}

/// A feed record: one HCM integration event.
///
/// Field names on the wire and in the store match the attribute names of
/// the table (`PersonId`, `EntryId`, `DMLOperation`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    pub person_id: String,
    pub entry_id: String,
    pub feed: String,
    #[serde(rename = "DMLOperation")]
    pub dml_operation: DmlOperation,
    pub is_processed: bool,
    pub worker_type: String,
    pub processed_message: String,
    /// Always [`CONSTANT_KEY_VALUE`].
    pub constant_key: String,
    /// Set once at creation.
    #[serde(with = "iso_millis")]
    pub published_date_time: DateTime<Utc>,
    /// Bumped on every mutating write.
    #[serde(with = "iso_millis")]
    pub updated_date_time: DateTime<Utc>,
}

impl Record {
    /// Primary key of this record.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.person_id.clone(), self.entry_id.clone())
    }

    /// Applies a processing status change, bumping `UpdatedDateTime`.
    pub fn set_processed(&mut self, is_processed: bool, now: DateTime<Utc>) {
        self.is_processed = is_processed;
        self.updated_date_time = now;
    }
}
