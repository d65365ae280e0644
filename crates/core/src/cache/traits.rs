use async_trait::async_trait;

use super::Result;

/// Cache for responses of external APIs.
///
/// Implementations decide expiry themselves; callers only read, write and drop keys.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key. Expired values read as `None`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Drops a value. Missing keys are not an error.
    async fn invalidate(&self, key: &str) -> Result<()>;
}
