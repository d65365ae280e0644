use slackmap_core::entities::{
    ChangelogKeys, CountryIndexKeys, CountryInfo, CountryItem, CountryKeys, FeatureChangelog,
    FeatureType, COUNTRY_INFO, FEATURE_CHANGELOG,
};
use slackmap_core::keys::{Composed, KeyAttr, KeyError};
use slackmap_core::storage::{
    FlatRecord, Page, PageRequest, QueryRequest, RepositoryError, Result, SortCondition,
    StorageClient, TableIndex,
};
use slackmap_core::transform::check_identifiers;

use super::{index_query, SlackmapRepository};
use crate::query::{query_all, query_page};

impl<S: StorageClient> SlackmapRepository<S> {
    pub async fn get_country_info(&self, country_code: &str) -> Result<Option<CountryInfo>> {
        self.get_entity(&COUNTRY_INFO, &CountryKeys::new(country_code))
            .await
    }

    pub async fn put_country_info(&self, info: &CountryInfo) -> Result<()> {
        self.put_entity(&COUNTRY_INFO, info).await
    }

    pub async fn delete_country_info(&self, country_code: &str) -> Result<()> {
        self.delete_entity(&COUNTRY_INFO, &CountryKeys::new(country_code))
            .await
    }

    /// Every country rollup, ordered by country code.
    pub async fn get_all_country_infos(&self) -> Result<Vec<CountryInfo>> {
        let request = index_query(&COUNTRY_INFO, TableIndex::Gsi, &CountryKeys::default())?;
        self.query_all_entities(&COUNTRY_INFO, request).await
    }

    /// One page of a country's feature details, optionally narrowed to one type.
    pub async fn get_country_features(
        &self,
        country_code: &str,
        feature_type: Option<FeatureType>,
        page: PageRequest,
    ) -> Result<Page<CountryItem>> {
        let request = self.bounded(country_features_query(country_code, feature_type)?, page);
        let raw = query_page(&self.storage, &request).await?;
        Ok(Page {
            items: decode_country_items(raw.items)?,
            last_evaluated_key: raw.last_evaluated_key,
        })
    }

    /// Every feature detail in a country, optionally narrowed to one type.
    pub async fn get_all_country_features(
        &self,
        country_code: &str,
        feature_type: Option<FeatureType>,
    ) -> Result<Vec<CountryItem>> {
        let request = country_features_query(country_code, feature_type)?;
        let items = query_all(&self.storage, &request).await?;
        decode_country_items(items)
    }

    /// One page of a country's changelog, most recent first.
    pub async fn get_country_changelogs(
        &self,
        country_code: &str,
        page: PageRequest,
    ) -> Result<Page<FeatureChangelog>> {
        let keys = ChangelogKeys {
            country_code: Some(country_code.to_string()),
            ..ChangelogKeys::default()
        };
        let request = index_query(&FEATURE_CHANGELOG, TableIndex::Gsi2, &keys)?
            .with_scan_forward(false);
        self.query_entities(&FEATURE_CHANGELOG, request, page).await
    }
}

fn country_features_query(
    country_code: &str,
    feature_type: Option<FeatureType>,
) -> Result<QueryRequest> {
    let keys = CountryIndexKeys {
        country_code: Some(country_code.to_string()),
        feature_type,
        ..CountryIndexKeys::default()
    };

    check_identifiers(&keys).map_err(|e| RepositoryError::Transform(e.into()))?;
    let partition = keys
        .partition()
        .and_then(Composed::into_full)
        .ok_or_else(|| {
            RepositoryError::Transform(
                KeyError::Incomplete {
                    entity: "CountryIndex",
                    attr: KeyAttr::Gsi2,
                }
                .into(),
            )
        })?;

    let request = QueryRequest::new(TableIndex::Gsi2, partition);
    Ok(match keys.sort() {
        Some(prefix) => request.with_sort(SortCondition::begins_with(prefix)),
        None => request,
    })
}

/// Records that are neither feature details nor changelogs are skipped.
fn decode_country_items(records: Vec<FlatRecord>) -> Result<Vec<CountryItem>> {
    let mut items = Vec::with_capacity(records.len());
    for record in &records {
        match CountryItem::from_record(record)? {
            Some(item) => items.push(item),
            None => tracing::debug!("Skipping unrecognized record in country index"),
        }
    }
    Ok(items)
}
