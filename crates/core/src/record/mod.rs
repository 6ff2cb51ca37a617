mod entry_id;
mod error;
mod mock_data;
mod requests;
mod types;

pub use entry_id::{generate_entry_id, is_valid_entry_id, ENTRY_ID_PREFIX};
pub use error::ValidationError;
pub use mock_data::generate_mock_records;
pub use requests::{
    BatchDeleteRequest, CreateRecordRequest, DeleteRecordRequest, NewRecord, RecordKeyRequest,
    SearchQuery, UpdateProcessedStatusRequest,
};
pub use types::{
    attr, DmlOperation, Record, RecordKey, CONSTANT_KEY_VALUE, ENTRY_INDEX, PUBLISHED_INDEX,
    UPDATED_INDEX,
};
