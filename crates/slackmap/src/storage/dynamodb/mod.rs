//! DynamoDB storage backend implementation.
//!
//! Implements `slackmap_core::storage::StorageClient` with `aws-sdk-dynamodb`.

mod conversions;
mod error;
mod storage;

pub use storage::DynamoDbStorage;
