//! Query execution and batch writes over a [`StorageClient`].
//!
//! Bounded queries return one page and its continuation key. Exhaustive queries
//! follow continuation keys, one request at a time, until the store returns none.
//! Batch writes are split into DynamoDB-sized chunks, and each chunk is resubmitted
//! until the store has processed every request.

use std::time::Duration;

use slackmap_core::storage::{FlatRecord, QueryPage, QueryRequest, Result, StorageClient, WriteRequest};

use crate::config::Config;

/// Most write requests DynamoDB accepts in one `BatchWriteItem` call.
pub const BATCH_WRITE_LIMIT: usize = 25;

/// Capped exponential backoff between batch-write retry rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            base_delay,
            max_delay,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.batch_retry_base_delay(), config.batch_retry_max_delay())
    }

    /// Delay before retry round `round` (0-based).
    pub fn delay(&self, round: u32) -> Duration {
        let factor = 2u32.saturating_pow(round);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Runs a single page of a query.
pub async fn query_page<S>(storage: &S, request: &QueryRequest) -> Result<QueryPage>
where
    S: StorageClient + ?Sized,
{
    let page = storage.query(request).await?;
    tracing::debug!(
        index = ?request.index,
        partition = %request.partition,
        items = page.items.len(),
        has_more = page.last_evaluated_key.is_some(),
        "Query page"
    );
    Ok(page)
}

/// Runs a query to exhaustion and returns every item.
///
/// `request.exclusive_start_key` is the starting point; `request.limit` sets the page
/// size of each round trip, not the total.
pub async fn query_all<S>(storage: &S, request: &QueryRequest) -> Result<Vec<FlatRecord>>
where
    S: StorageClient + ?Sized,
{
    let mut request = request.clone();
    let mut items = Vec::new();
    let mut pages = 0usize;

    loop {
        let page = storage.query(&request).await?;
        pages += 1;
        items.extend(page.items);

        match page.last_evaluated_key {
            Some(key) => request.exclusive_start_key = Some(key),
            None => break,
        }
    }

    tracing::debug!(
        index = ?request.index,
        partition = %request.partition,
        items = items.len(),
        pages,
        "Exhaustive query"
    );
    Ok(items)
}

/// Writes every request, retrying unprocessed ones until none remain.
///
/// There is no retry cap here; errors from the store end the drain and are
/// propagated.
pub async fn batch_write_all<S>(
    storage: &S,
    requests: Vec<WriteRequest>,
    retry: &RetryPolicy,
) -> Result<()>
where
    S: StorageClient + ?Sized,
{
    let total = requests.len();
    let mut rounds = 0u32;

    let mut requests = requests.into_iter().peekable();
    while requests.peek().is_some() {
        let chunk: Vec<WriteRequest> = requests.by_ref().take(BATCH_WRITE_LIMIT).collect();
        rounds += drain_chunk(storage, chunk, retry).await?;
    }

    if total > 0 {
        tracing::info!(requests = total, retry_rounds = rounds, "Batch write drained");
    }
    Ok(())
}

/// Returns the number of retry rounds the chunk needed.
async fn drain_chunk<S>(storage: &S, chunk: Vec<WriteRequest>, retry: &RetryPolicy) -> Result<u32>
where
    S: StorageClient + ?Sized,
{
    let mut pending = storage.batch_write(chunk).await?;
    let mut round = 0u32;

    while !pending.is_empty() {
        let delay = retry.delay(round);
        tracing::debug!(
            unprocessed = pending.len(),
            round,
            delay_ms = delay.as_millis() as u64,
            "Retrying unprocessed writes"
        );
        tokio::time::sleep(delay).await;

        let submitted = pending.len();
        pending = storage.batch_write(pending).await?;
        if pending.len() == submitted {
            tracing::warn!(unprocessed = submitted, round, "Batch write made no progress");
        }
        round = round.saturating_add(1);
    }

    Ok(round)
}
