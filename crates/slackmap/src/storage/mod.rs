//! Storage backend implementations.
//!
//! Concrete implementations of `slackmap_core::storage::StorageClient`, selected
//! via feature flags.
//!
//! # Feature Flags
//!
//! - `inmemory` (default): in-process table with the real index semantics, for tests
//!   and development
//! - `dynamodb`: AWS DynamoDB backend using `aws-sdk-dynamodb`
//!
//! Both can be enabled at once; the caller picks the adapter it constructs.

#[cfg(not(any(feature = "inmemory", feature = "dynamodb")))]
compile_error!(
    "No storage backend selected. Enable 'inmemory' or 'dynamodb' feature. \
    Example: cargo build -p slackmap --features dynamodb"
);

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryStorage;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbStorage;
