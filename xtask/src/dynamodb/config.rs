//! Table configuration types (Functional Core - pure data).

use feedrecords_core::record::{attr, ENTRY_INDEX, PUBLISHED_INDEX, UPDATED_INDEX};

/// Table name used when neither `--table-name` nor `TABLE_NAME` is given.
pub const DEFAULT_TABLE_NAME: &str = "feed-records";

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    pub gsis: Vec<GsiConfig>,
    pub billing_mode: BillingMode,
}

/// A string key attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
}

impl KeyAttribute {
    fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// Global Secondary Index configuration. Every index projects all attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsiConfig {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
}

/// Billing mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    PayPerRequest,
}

impl TableConfig {
    /// Sets the table name.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    /// Every attribute used by the table or one of its indexes, without duplicates.
    pub fn key_attribute_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let table_keys = std::iter::once(&self.partition_key).chain(self.sort_key.as_ref());
        let index_keys = self
            .gsis
            .iter()
            .flat_map(|gsi| std::iter::once(&gsi.partition_key).chain(gsi.sort_key.as_ref()));

        for key in table_keys.chain(index_keys) {
            if !names.contains(&key.name.as_str()) {
                names.push(&key.name);
            }
        }
        names
    }
}

/// Returns the canonical feed records table configuration.
///
/// Records are keyed by `(PersonId, EntryId)`. `PublishedIndex` and
/// `UpdatedIndex` put every record under the constant partition so listings
/// can be ordered by time; `EntryIndex` looks records up by entry id alone.
pub fn records_table_config() -> TableConfig {
    TableConfig {
        table_name: DEFAULT_TABLE_NAME.to_string(),
        partition_key: KeyAttribute::string(attr::PERSON_ID),
        sort_key: Some(KeyAttribute::string(attr::ENTRY_ID)),
        gsis: vec![
            GsiConfig {
                name: PUBLISHED_INDEX.to_string(),
                partition_key: KeyAttribute::string(attr::CONSTANT_KEY),
                sort_key: Some(KeyAttribute::string(attr::PUBLISHED_DATE_TIME)),
            },
            GsiConfig {
                name: UPDATED_INDEX.to_string(),
                partition_key: KeyAttribute::string(attr::CONSTANT_KEY),
                sort_key: Some(KeyAttribute::string(attr::UPDATED_DATE_TIME)),
            },
            GsiConfig {
                name: ENTRY_INDEX.to_string(),
                partition_key: KeyAttribute::string(attr::ENTRY_ID),
                sort_key: None,
            },
        ],
        billing_mode: BillingMode::PayPerRequest,
    }
}
