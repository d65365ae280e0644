use slackmap_core::entities::{ChangelogKeys, FeatureChangelog, FeatureType, FEATURE_CHANGELOG};
use slackmap_core::storage::{Page, PageRequest, Result, StorageClient, TableIndex};

use super::{index_query, SlackmapRepository};

impl<S: StorageClient> SlackmapRepository<S> {
    pub async fn put_feature_changelog(&self, changelog: &FeatureChangelog) -> Result<()> {
        self.put_entity(&FEATURE_CHANGELOG, changelog).await
    }

    /// One page of a feature's changelog, most recent first.
    pub async fn get_feature_changelogs(
        &self,
        feature_id: &str,
        feature_type: FeatureType,
        page: PageRequest,
    ) -> Result<Page<FeatureChangelog>> {
        let keys = ChangelogKeys::for_feature(feature_id, feature_type);
        let request =
            index_query(&FEATURE_CHANGELOG, TableIndex::Primary, &keys)?.with_scan_forward(false);
        self.query_entities(&FEATURE_CHANGELOG, request, page).await
    }

    /// One page of everything a user changed, most recent first.
    pub async fn get_user_changelogs(
        &self,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Page<FeatureChangelog>> {
        let keys = ChangelogKeys {
            user_id: Some(user_id.to_string()),
            ..ChangelogKeys::default()
        };
        let request =
            index_query(&FEATURE_CHANGELOG, TableIndex::Gsi3, &keys)?.with_scan_forward(false);
        self.query_entities(&FEATURE_CHANGELOG, request, page).await
    }

    /// One page of a user's changes to one feature, most recent first.
    pub async fn get_user_feature_changelogs(
        &self,
        feature_id: &str,
        feature_type: FeatureType,
        user_id: &str,
        page: PageRequest,
    ) -> Result<Page<FeatureChangelog>> {
        let keys = ChangelogKeys::for_feature(feature_id, feature_type).with_user(user_id);
        let request =
            index_query(&FEATURE_CHANGELOG, TableIndex::Lsi2, &keys)?.with_scan_forward(false);
        self.query_entities(&FEATURE_CHANGELOG, request, page).await
    }
}
