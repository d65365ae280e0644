use async_trait::async_trait;

use super::{FlatRecord, QueryPage, QueryRequest, Result, WriteRequest};

/// Thin adapter over the key-value store backing the table.
///
/// Implementations are bound to one table. Errors are transport or backend failures and
/// are propagated to callers unchanged.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Gets a single item by its primary key.
    async fn get(&self, key: &FlatRecord) -> Result<Option<FlatRecord>>;

    /// Runs one page of a key-condition query.
    async fn query(&self, request: &QueryRequest) -> Result<QueryPage>;

    /// Writes an item, replacing any item with the same primary key.
    async fn put(&self, record: FlatRecord) -> Result<()>;

    /// Deletes the item with the given primary key. Missing items are not an error.
    async fn delete(&self, key: &FlatRecord) -> Result<()>;

    /// Submits a batch of writes and returns the requests the store did not process.
    async fn batch_write(&self, requests: Vec<WriteRequest>) -> Result<Vec<WriteRequest>>;
}
