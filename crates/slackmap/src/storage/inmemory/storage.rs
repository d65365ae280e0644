//! In-memory table implementation.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use slackmap_core::keys::KeyAttr;
use slackmap_core::storage::{
    record_str, FlatRecord, QueryPage, QueryRequest, RepositoryError, Result, StorageClient,
    TableIndex, WriteRequest,
};

/// `(PK, SK_GSI)`
type PrimaryKey = (String, String);

/// Where a record sits within an index: its sort value, then its primary key.
///
/// Global indexes may hold several items with the same sort value, so the primary key
/// breaks ties to keep ordering and continuation stable.
type IndexPosition = (String, String, String);

/// In-memory table for testing.
///
/// Evaluates queries the way DynamoDB does: partition equality, an optional sort
/// condition, ordering by the index sort key, sparse indexes (items lacking the
/// index attributes are not in the index), `Limit` and `ExclusiveStartKey`. A page
/// that fills its limit always carries a continuation key, even when nothing is left,
/// so callers see the same trailing empty page DynamoDB can return.
///
/// Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    records: Arc<RwLock<BTreeMap<PrimaryKey, FlatRecord>>>,
}

impl InMemoryStorage {
    /// Creates a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Every stored record, ordered by primary key.
    pub async fn records(&self) -> Vec<FlatRecord> {
        self.records.read().await.values().cloned().collect()
    }
}

fn primary_key(record: &FlatRecord) -> Result<PrimaryKey> {
    let attr = |attr: KeyAttr| {
        record_str(record, attr)
            .map(String::from)
            .ok_or_else(|| RepositoryError::InvalidData(format!("Record has no string {attr}")))
    };
    Ok((attr(KeyAttr::Pk)?, attr(KeyAttr::SkGsi)?))
}

fn index_position(index: TableIndex, record: &FlatRecord) -> Option<IndexPosition> {
    Some((
        record_str(record, index.sort_attr())?.to_string(),
        record_str(record, KeyAttr::Pk)?.to_string(),
        record_str(record, KeyAttr::SkGsi)?.to_string(),
    ))
}

fn continuation_key(index: TableIndex, record: &FlatRecord) -> FlatRecord {
    index
        .cursor_attrs()
        .into_iter()
        .filter_map(|attr| {
            record
                .get(attr.name())
                .map(|value| (attr.name().to_string(), value.clone()))
        })
        .collect()
}

#[async_trait]
impl StorageClient for InMemoryStorage {
    async fn get(&self, key: &FlatRecord) -> Result<Option<FlatRecord>> {
        let key = primary_key(key)?;
        let records = self.records.read().await;
        Ok(records.get(&key).cloned())
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryPage> {
        if request.limit == Some(0) {
            return Err(RepositoryError::InvalidData(
                "Query limit must be at least 1".to_string(),
            ));
        }

        let index = request.index;
        let start = match &request.exclusive_start_key {
            Some(key) => Some(index_position(index, key).ok_or_else(|| {
                RepositoryError::InvalidData(format!(
                    "Exclusive start key does not address the {index:?} index"
                ))
            })?),
            None => None,
        };

        let records = self.records.read().await;

        let mut matched: Vec<(IndexPosition, &FlatRecord)> = records
            .values()
            .filter(|record| {
                record_str(record, index.partition_attr()) == Some(request.partition.as_str())
            })
            .filter_map(|record| index_position(index, record).map(|pos| (pos, record)))
            .filter(|(pos, _)| {
                request
                    .sort
                    .as_ref()
                    .is_none_or(|condition| condition.is_satisfied_by(&pos.0))
            })
            .collect();

        matched.sort_by(|a, b| a.0.cmp(&b.0));
        if !request.scan_forward {
            matched.reverse();
        }

        if let Some(start) = &start {
            matched.retain(|(pos, _)| {
                if request.scan_forward {
                    pos > start
                } else {
                    pos < start
                }
            });
        }

        let limit = request.limit.map_or(usize::MAX, |limit| limit as usize);
        let items: Vec<FlatRecord> = matched
            .into_iter()
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect();

        let last_evaluated_key = match items.last() {
            Some(last) if items.len() == limit => Some(continuation_key(index, last)),
            _ => None,
        };

        Ok(QueryPage {
            items,
            last_evaluated_key,
        })
    }

    async fn put(&self, record: FlatRecord) -> Result<()> {
        let key = primary_key(&record)?;
        self.records.write().await.insert(key, record);
        Ok(())
    }

    async fn delete(&self, key: &FlatRecord) -> Result<()> {
        let key = primary_key(key)?;
        self.records.write().await.remove(&key);
        Ok(())
    }

    async fn batch_write(&self, requests: Vec<WriteRequest>) -> Result<Vec<WriteRequest>> {
        let mut records = self.records.write().await;
        for request in requests {
            match request {
                WriteRequest::Put(record) => {
                    let key = primary_key(&record)?;
                    records.insert(key, record);
                }
                WriteRequest::Delete(key) => {
                    records.remove(&primary_key(&key)?);
                }
            }
        }
        Ok(Vec::new())
    }
}
