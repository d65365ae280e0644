//! Per-entity repository over a single table.
//!
//! Every operation is parameterized by natural identifiers (feature ids, country
//! codes, user ids) and composes the physical keys through the entity schemas in
//! `slackmap_core::entities`. Operations are split by entity:
//!
//! - `country`: country rollups and the country-wide feature/changelog index
//! - `details`: line, spot and guide details
//! - `editor`: feature editor permissions
//! - `changelog`: feature changelog entries

mod changelog;
mod country;
mod details;
mod editor;

use serde::de::DeserializeOwned;
use serde::Serialize;

use slackmap_core::keys::{Composed, KeyAttr, KeyError, KeyFields};
use slackmap_core::storage::{
    FlatRecord, Page, PageRequest, QueryRequest, RepositoryError, Result, SortCondition,
    StorageClient, TableIndex, WriteRequest,
};
use slackmap_core::transform::{check_identifiers, Entity, Transformer};

use crate::config::Config;
use crate::query::{batch_write_all, query_all, query_page, RetryPolicy};

/// Typed access to every entity stored in the table.
#[derive(Debug, Clone)]
pub struct SlackmapRepository<S> {
    storage: S,
    retry: RetryPolicy,
    page_limit: u32,
}

impl<S: StorageClient> SlackmapRepository<S> {
    pub fn new(storage: S, config: &Config) -> Self {
        Self {
            storage,
            retry: RetryPolicy::from_config(config),
            page_limit: config.query_page_limit,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Point read by primary key.
    async fn get_entity<K, A>(
        &self,
        transformer: &Transformer<K, A>,
        keys: &K,
    ) -> Result<Option<Entity<K, A>>>
    where
        K: KeyFields,
        A: Serialize + DeserializeOwned,
    {
        let key = transformer.key(keys)?;
        match self.storage.get(&key).await? {
            Some(record) => Ok(Some(transformer.attrs_to_item(&record)?)),
            None => Ok(None),
        }
    }

    async fn put_entity<K, A>(&self, transformer: &Transformer<K, A>, item: &Entity<K, A>) -> Result<()>
    where
        K: KeyFields,
        A: Serialize + DeserializeOwned,
    {
        let record = transformer.item_to_attrs(item)?;
        self.storage.put(record).await?;
        tracing::debug!(entity = %transformer.kind(), "Stored item");
        Ok(())
    }

    async fn delete_entity<K, A>(&self, transformer: &Transformer<K, A>, keys: &K) -> Result<()>
    where
        K: KeyFields,
        A: Serialize + DeserializeOwned,
    {
        let key = transformer.key(keys)?;
        self.storage.delete(&key).await?;
        tracing::debug!(entity = %transformer.kind(), "Deleted item");
        Ok(())
    }

    /// One page of a query, decoded as `transformer`'s entity.
    ///
    /// Records of any other shape in the partition are skipped.
    async fn query_entities<K, A>(
        &self,
        transformer: &Transformer<K, A>,
        request: QueryRequest,
        page: PageRequest,
    ) -> Result<Page<Entity<K, A>>>
    where
        K: KeyFields,
        A: Serialize + DeserializeOwned,
    {
        let request = self.bounded(request, page);
        let raw = query_page(&self.storage, &request).await?;
        Ok(Page {
            items: decode_all(transformer, raw.items)?,
            last_evaluated_key: raw.last_evaluated_key,
        })
    }

    /// Every item a query returns, decoded as `transformer`'s entity.
    async fn query_all_entities<K, A>(
        &self,
        transformer: &Transformer<K, A>,
        request: QueryRequest,
    ) -> Result<Vec<Entity<K, A>>>
    where
        K: KeyFields,
        A: Serialize + DeserializeOwned,
    {
        let items = query_all(&self.storage, &request).await?;
        decode_all(transformer, items)
    }

    async fn write_all(&self, requests: Vec<WriteRequest>) -> Result<()> {
        batch_write_all(&self.storage, requests, &self.retry).await
    }

    /// Applies the caller's paging, falling back to the configured page limit.
    fn bounded(&self, request: QueryRequest, page: PageRequest) -> QueryRequest {
        request
            .with_start_key(page.start_key)
            .with_limit(Some(page.limit.unwrap_or(self.page_limit)))
    }
}

fn decode_all<K, A>(
    transformer: &Transformer<K, A>,
    records: Vec<FlatRecord>,
) -> Result<Vec<Entity<K, A>>>
where
    K: KeyFields,
    A: Serialize + DeserializeOwned,
{
    let mut items = Vec::with_capacity(records.len());
    for record in &records {
        if !transformer.is_record_type_matching(record) {
            tracing::debug!(entity = %transformer.kind(), "Skipping record of another type");
            continue;
        }
        items.push(transformer.attrs_to_item(record)?);
    }
    Ok(items)
}

/// A complete key value for a partition or equality position.
fn full_key<K, A>(transformer: &Transformer<K, A>, attr: KeyAttr, keys: &K) -> Result<String>
where
    K: KeyFields,
    A: Serialize + DeserializeOwned,
{
    check_identifiers(keys).map_err(|e| RepositoryError::Transform(e.into()))?;
    transformer
        .compose(attr, keys)
        .and_then(Composed::into_full)
        .ok_or_else(|| {
            RepositoryError::Transform(
                KeyError::Incomplete {
                    entity: transformer.kind().as_str(),
                    attr,
                }
                .into(),
            )
        })
}

/// Query on `index` with the partition composed in full from `keys`.
///
/// The sort attribute, when it composes, becomes an equality condition if complete
/// and a `begins_with` condition if partial.
fn index_query<K, A>(
    transformer: &Transformer<K, A>,
    index: TableIndex,
    keys: &K,
) -> Result<QueryRequest>
where
    K: KeyFields,
    A: Serialize + DeserializeOwned,
{
    let partition = full_key(transformer, index.partition_attr(), keys)?;
    let request = QueryRequest::new(index, partition);
    Ok(match transformer.compose(index.sort_attr(), keys) {
        Some(Composed::Full(sort)) => request.with_sort(SortCondition::Equals(sort)),
        Some(prefix) => request.with_sort(SortCondition::begins_with(prefix)),
        None => request,
    })
}
