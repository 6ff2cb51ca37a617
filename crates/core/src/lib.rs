//! Functional core for feedrecords.
//!
//! Pure types and functions shared by the server and the dev tasks: the
//! record model, request validation, the pagination token codec, filter
//! composition and page shaping, plus the storage contract the imperative
//! shell implements. Nothing in this crate performs I/O.

pub mod pagination;
pub mod record;
pub mod serde;
pub mod storage;
