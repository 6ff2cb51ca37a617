//! DynamoDB storage backend.
//!
//! Implements [`RecordStore`](feedrecords_core::storage::RecordStore) against
//! a single table keyed by `PersonId`/`EntryId`, with the published index
//! (`ConstantKey`, `PublishedDateTime`) serving the listings.

mod conversions;
mod error;
mod repository;

pub use repository::DynamoDbRepository;
