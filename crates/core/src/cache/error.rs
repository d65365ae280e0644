use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache operation failed: {0}")]
    OperationFailed(String),
    #[error("Failed to serialize cache value: {0}")]
    Serialize(String),
    #[error("Failed to deserialize cache value: {0}")]
    Deserialize(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_failed_display() {
        let error = CacheError::OperationFailed("lock poisoned".to_string());
        assert_eq!(error.to_string(), "Cache operation failed: lock poisoned");
    }

    #[test]
    fn test_deserialize_display() {
        let error = CacheError::Deserialize("invalid JSON".to_string());
        assert_eq!(
            error.to_string(),
            "Failed to deserialize cache value: invalid JSON"
        );
    }
}
