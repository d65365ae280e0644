//! In-memory storage backend for testing.
//!
//! Stores every record in a `BTreeMap` wrapped in `Arc<RwLock<_>>` and evaluates
//! queries against the same index layout the DynamoDB table has.
//!
//! # Example
//!
//! ```rust,ignore
//! use slackmap::storage::InMemoryStorage;
//!
//! let storage = InMemoryStorage::new();
//! // Use storage for testing...
//! ```

mod storage;

pub use storage::InMemoryStorage;
