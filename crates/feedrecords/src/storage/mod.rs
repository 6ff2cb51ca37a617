//! Storage backend implementations.
//!
//! This module provides concrete implementations of the
//! [`RecordStore`](feedrecords_core::storage::RecordStore) trait. The
//! implementation is selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): in-process store, no external dependencies
//! - `dynamodb`: AWS DynamoDB storage backend using `aws-sdk-dynamodb`
//!
//! These features are mutually exclusive - only one storage backend can be
//! enabled at a time.
//!
//! # Examples
//!
//! Build with the in-memory store (default):
//! ```bash
//! cargo build -p feedrecords
//! ```
//!
//! Build with DynamoDB:
//! ```bash
//! cargo build -p feedrecords --no-default-features --features dynamodb
//! ```

// Compile-time checks for mutual exclusivity
#[cfg(all(feature = "inmemory", feature = "dynamodb"))]
compile_error!(
    "Features 'inmemory' and 'dynamodb' are mutually exclusive. \
    Enable only one storage backend at a time."
);

#[cfg(not(any(feature = "inmemory", feature = "dynamodb")))]
compile_error!(
    "No storage backend selected. Enable 'inmemory' or 'dynamodb' feature. \
    Example: cargo build -p feedrecords --features dynamodb"
);

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

// Tests always run against the in-memory store.
#[cfg(any(feature = "inmemory", test))]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbRepository;

#[cfg(any(feature = "inmemory", test))]
pub use inmemory::InMemoryRepository;
