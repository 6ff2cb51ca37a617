use chrono::{DateTime, Duration, Utc};

use super::entry_id::generate_entry_id;
use super::types::{DmlOperation, Record, CONSTANT_KEY_VALUE};

const FEEDS: [&str; 4] = ["empassignment", "person", "salary", "workrelationship"];
const WORKER_TYPES: [&str; 3] = ["EMP", "CWK", "PEN"];
const OPERATIONS: [DmlOperation; 3] = [
    DmlOperation::Insert,
    DmlOperation::Update,
    DmlOperation::Delete,
];

/// Generates demo records for seeding a table.
///
/// Records are published one minute apart going back from `newest`, so the
/// first record is the newest. Feeds, operations and worker types rotate and
/// roughly a third of the records are processed.
pub fn generate_mock_records(count: u32, newest: DateTime<Utc>) -> Vec<Record> {
    (0..count)
        .map(|i| {
            let idx = i as usize;
            let published = newest - Duration::minutes(i as i64);
            let is_processed = i % 3 == 0;
            let processed_message = if is_processed {
                "Processed successfully".to_string()
            } else {
                "Pending processing".to_string()
            };

            Record {
                person_id: (100 + i % 25).to_string(),
                entry_id: generate_entry_id(),
                feed: FEEDS[idx % FEEDS.len()].to_string(),
                dml_operation: OPERATIONS[idx % OPERATIONS.len()],
                is_processed,
                worker_type: WORKER_TYPES[idx % WORKER_TYPES.len()].to_string(),
                processed_message,
                constant_key: CONSTANT_KEY_VALUE.to_string(),
                published_date_time: published,
                updated_date_time: published,
            }
        })
        .collect()
}
