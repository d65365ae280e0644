use thiserror::Error;

use crate::transform::TransformError;

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
