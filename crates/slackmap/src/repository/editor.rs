use slackmap_core::entities::{EditorKeys, EditorType, FeatureEditor, FeatureType, FEATURE_EDITOR};
use slackmap_core::storage::{Page, PageRequest, Result, StorageClient, TableIndex, WriteRequest};

use super::{index_query, SlackmapRepository};

impl<S: StorageClient> SlackmapRepository<S> {
    pub async fn get_feature_editor(
        &self,
        feature_id: &str,
        feature_type: FeatureType,
        user_id: &str,
    ) -> Result<Option<FeatureEditor>> {
        let keys = EditorKeys::for_feature(feature_id, feature_type).with_user(user_id);
        self.get_entity(&FEATURE_EDITOR, &keys).await
    }

    pub async fn put_feature_editor(&self, editor: &FeatureEditor) -> Result<()> {
        self.put_entity(&FEATURE_EDITOR, editor).await
    }

    pub async fn delete_feature_editor(
        &self,
        feature_id: &str,
        feature_type: FeatureType,
        user_id: &str,
    ) -> Result<()> {
        let keys = EditorKeys::for_feature(feature_id, feature_type).with_user(user_id);
        self.delete_entity(&FEATURE_EDITOR, &keys).await
    }

    /// One page of a feature's editors, ordered by user id.
    pub async fn get_feature_editors(
        &self,
        feature_id: &str,
        feature_type: FeatureType,
        page: PageRequest,
    ) -> Result<Page<FeatureEditor>> {
        let keys = EditorKeys::for_feature(feature_id, feature_type);
        let request = index_query(&FEATURE_EDITOR, TableIndex::Primary, &keys)?;
        self.query_entities(&FEATURE_EDITOR, request, page).await
    }

    /// Every owner of a feature.
    pub async fn get_feature_owners(
        &self,
        feature_id: &str,
        feature_type: FeatureType,
    ) -> Result<Vec<FeatureEditor>> {
        let keys =
            EditorKeys::for_feature(feature_id, feature_type).with_editor_type(EditorType::Owner);
        let request = index_query(&FEATURE_EDITOR, TableIndex::Lsi, &keys)?;
        self.query_all_entities(&FEATURE_EDITOR, request).await
    }

    /// One page of the features a user may edit, optionally narrowed to one type.
    pub async fn get_user_editable_features(
        &self,
        user_id: &str,
        feature_type: Option<FeatureType>,
        page: PageRequest,
    ) -> Result<Page<FeatureEditor>> {
        let keys = EditorKeys {
            feature_type,
            ..EditorKeys::for_user(user_id)
        };
        let request = index_query(&FEATURE_EDITOR, TableIndex::Gsi, &keys)?;
        self.query_entities(&FEATURE_EDITOR, request, page).await
    }

    /// Removes every editor of a feature and returns how many there were.
    pub async fn delete_all_feature_editors(
        &self,
        feature_id: &str,
        feature_type: FeatureType,
    ) -> Result<usize> {
        let keys = EditorKeys::for_feature(feature_id, feature_type);
        let request = index_query(&FEATURE_EDITOR, TableIndex::Primary, &keys)?;
        let editors = self.query_all_entities(&FEATURE_EDITOR, request).await?;

        let deletes = editors
            .iter()
            .map(|editor| FEATURE_EDITOR.key(&editor.keys).map(WriteRequest::Delete))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let count = deletes.len();
        self.write_all(deletes).await?;

        tracing::info!(feature_id, %feature_type, editors = count, "Removed feature editors");
        Ok(count)
    }
}
