//! In-memory storage backend.
//!
//! Stores records in a `BTreeMap` wrapped in `Arc<RwLock<_>>` and emulates the
//! store semantics the record service depends on: limit before filter,
//! descending index order, exclusive start keys and the batch-write limit.
//! Useful for tests and local development without DynamoDB.
//!
//! # Example
//!
//! ```rust,ignore
//! use feedrecords::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
