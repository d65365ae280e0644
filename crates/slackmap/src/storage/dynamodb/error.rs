//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `RepositoryError` from `slackmap_core::storage`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::batch_write_item::BatchWriteItemError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::query::QueryError;
use slackmap_core::storage::RepositoryError;

const THROUGHPUT_EXCEEDED: &str = "Throughput exceeded, please retry";
const REQUEST_LIMIT_EXCEEDED: &str = "Request limit exceeded, please retry";
const INTERNAL_SERVER_ERROR: &str = "DynamoDB internal server error";

fn table_not_found(table: &str) -> RepositoryError {
    RepositoryError::QueryFailed(format!("Table not found: {table}"))
}

fn failed(reason: &str) -> RepositoryError {
    RepositoryError::QueryFailed(reason.to_string())
}

/// Requests that never reached DynamoDB.
fn transport_failure<E: Debug, R: Debug>(err: &SdkError<E, R>) -> Option<RepositoryError> {
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            Some(RepositoryError::ConnectionFailed(format!("{:?}", err)))
        }
        _ => None,
    }
}

/// Map a GetItem SDK error to RepositoryError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
    table: &str,
) -> RepositoryError {
    if let Some(mapped) = transport_failure(&err) {
        return mapped;
    }
    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(_) => table_not_found(table),
        GetItemError::ProvisionedThroughputExceededException(_) => failed(THROUGHPUT_EXCEEDED),
        GetItemError::RequestLimitExceeded(_) => failed(REQUEST_LIMIT_EXCEEDED),
        GetItemError::InternalServerError(_) => failed(INTERNAL_SERVER_ERROR),
        err => RepositoryError::QueryFailed(format!("GetItem failed: {:?}", err)),
    }
}

/// Map a Query SDK error to RepositoryError.
pub fn map_query_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<QueryError, R>,
    table: &str,
) -> RepositoryError {
    if let Some(mapped) = transport_failure(&err) {
        return mapped;
    }
    match err.into_service_error() {
        QueryError::ResourceNotFoundException(_) => table_not_found(table),
        QueryError::ProvisionedThroughputExceededException(_) => failed(THROUGHPUT_EXCEEDED),
        QueryError::RequestLimitExceeded(_) => failed(REQUEST_LIMIT_EXCEEDED),
        QueryError::InternalServerError(_) => failed(INTERNAL_SERVER_ERROR),
        err => RepositoryError::QueryFailed(format!("Query failed: {:?}", err)),
    }
}

/// Map a PutItem SDK error to RepositoryError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table: &str,
) -> RepositoryError {
    if let Some(mapped) = transport_failure(&err) {
        return mapped;
    }
    match err.into_service_error() {
        PutItemError::ResourceNotFoundException(_) => table_not_found(table),
        PutItemError::ProvisionedThroughputExceededException(_) => failed(THROUGHPUT_EXCEEDED),
        PutItemError::RequestLimitExceeded(_) => failed(REQUEST_LIMIT_EXCEEDED),
        PutItemError::ItemCollectionSizeLimitExceededException(_) => {
            failed("Item collection size limit exceeded")
        }
        PutItemError::TransactionConflictException(_) => {
            failed("Transaction conflict, please retry")
        }
        PutItemError::InternalServerError(_) => failed(INTERNAL_SERVER_ERROR),
        err => RepositoryError::QueryFailed(format!("PutItem failed: {:?}", err)),
    }
}

/// Map a DeleteItem SDK error to RepositoryError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    table: &str,
) -> RepositoryError {
    if let Some(mapped) = transport_failure(&err) {
        return mapped;
    }
    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(_) => table_not_found(table),
        DeleteItemError::ProvisionedThroughputExceededException(_) => {
            failed(THROUGHPUT_EXCEEDED)
        }
        DeleteItemError::RequestLimitExceeded(_) => failed(REQUEST_LIMIT_EXCEEDED),
        DeleteItemError::ItemCollectionSizeLimitExceededException(_) => {
            failed("Item collection size limit exceeded")
        }
        DeleteItemError::TransactionConflictException(_) => {
            failed("Transaction conflict, please retry")
        }
        DeleteItemError::InternalServerError(_) => failed(INTERNAL_SERVER_ERROR),
        err => RepositoryError::QueryFailed(format!("DeleteItem failed: {:?}", err)),
    }
}

/// Map a BatchWriteItem SDK error to RepositoryError.
///
/// Throttling of individual requests does not land here; those come back as
/// unprocessed items.
pub fn map_batch_write_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<BatchWriteItemError, R>,
    table: &str,
) -> RepositoryError {
    if let Some(mapped) = transport_failure(&err) {
        return mapped;
    }
    match err.into_service_error() {
        BatchWriteItemError::ResourceNotFoundException(_) => table_not_found(table),
        BatchWriteItemError::ProvisionedThroughputExceededException(_) => {
            failed(THROUGHPUT_EXCEEDED)
        }
        BatchWriteItemError::RequestLimitExceeded(_) => failed(REQUEST_LIMIT_EXCEEDED),
        BatchWriteItemError::ItemCollectionSizeLimitExceededException(_) => {
            failed("Item collection size limit exceeded")
        }
        BatchWriteItemError::InternalServerError(_) => failed(INTERNAL_SERVER_ERROR),
        err => RepositoryError::QueryFailed(format!("BatchWriteItem failed: {:?}", err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_not_found_message() {
        assert_eq!(
            table_not_found("slackmap").to_string(),
            "Query failed: Table not found: slackmap"
        );
    }
}
