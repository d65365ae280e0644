//! Feature editors.
//!
//! An editor item links a user to a feature. It lives in the feature's partition,
//! sorts by user, and is reachable from the user's side through `GSI`, whose partition
//! is `SK_GSI` (`editor:<user_id>`) and whose sort key groups features by type.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::{
    compose_key_prefix, destruct_key, field_matches, has_discriminator, merge_field, Composed,
    KeyAttr, KeyFields, KeySchema, KeySlot,
};
use crate::transform::{Entity, Transformer};

use super::feature::{
    compose_feature_pk, compose_feature_type_key, destruct_feature_pk, destruct_feature_type_key,
    FeatureType, FEATURE_PREFIX, FEATURE_TYPE_PREFIX,
};
use super::EntityKind;

pub const EDITOR_PREFIX: &str = "editor";
pub const EDITOR_TYPE_PREFIX: &str = "editorType";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorType {
    Owner,
    Editor,
}

impl EditorType {
    pub const fn as_str(self) -> &'static str {
        match self {
            EditorType::Owner => "owner",
            EditorType::Editor => "editor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "owner" => Some(EditorType::Owner),
            "editor" => Some(EditorType::Editor),
            _ => None,
        }
    }
}

impl fmt::Display for EditorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EditorKeys {
    pub feature_id: Option<String>,
    pub feature_type: Option<FeatureType>,
    pub user_id: Option<String>,
    pub editor_type: Option<EditorType>,
}

impl EditorKeys {
    /// Keys addressing every editor of a feature.
    pub fn for_feature(feature_id: impl Into<String>, feature_type: FeatureType) -> Self {
        Self {
            feature_id: Some(feature_id.into()),
            feature_type: Some(feature_type),
            ..Self::default()
        }
    }

    /// Keys addressing every feature a user edits.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_type(mut self, feature_type: FeatureType) -> Self {
        self.feature_type = Some(feature_type);
        self
    }

    pub fn with_editor_type(mut self, editor_type: EditorType) -> Self {
        self.editor_type = Some(editor_type);
        self
    }
}

impl KeyFields for EditorKeys {
    fn merge(&mut self, other: Self) {
        merge_field(&mut self.feature_id, other.feature_id);
        merge_field(&mut self.feature_type, other.feature_type);
        merge_field(&mut self.user_id, other.user_id);
        merge_field(&mut self.editor_type, other.editor_type);
    }

    fn matches(&self, expected: &Self) -> bool {
        field_matches(&self.feature_id, &expected.feature_id)
            && field_matches(&self.feature_type, &expected.feature_type)
            && field_matches(&self.user_id, &expected.user_id)
            && field_matches(&self.editor_type, &expected.editor_type)
    }

    fn identifiers(&self) -> Vec<(&'static str, &str)> {
        [
            ("featureId", self.feature_id.as_deref()),
            ("userId", self.user_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorAttrs {
    pub created_date_time: DateTime<Utc>,
    /// User who granted the permission; absent for the creator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<String>,
}

pub type FeatureEditor = Entity<EditorKeys, EditorAttrs>;

fn compose_editor_pk(keys: &EditorKeys) -> Option<Composed> {
    compose_feature_pk(keys.feature_id.as_deref(), keys.feature_type)
}

fn destruct_editor_pk(raw: &str) -> Option<EditorKeys> {
    let (feature_id, feature_type) = destruct_feature_pk(raw)?;
    Some(EditorKeys {
        feature_id,
        feature_type,
        ..EditorKeys::default()
    })
}

/// Pattern: `editor:<user_id>`
fn compose_editor_sk(keys: &EditorKeys) -> Option<Composed> {
    compose_key_prefix(EDITOR_PREFIX, &[keys.user_id.as_deref()])
}

fn destruct_editor_sk(raw: &str) -> Option<EditorKeys> {
    has_discriminator(raw, EDITOR_PREFIX).then(|| EditorKeys {
        user_id: destruct_key(raw, 1).map(String::from),
        ..EditorKeys::default()
    })
}

/// Pattern: `editorType:<editor_type>:<user_id>`
fn compose_editor_type(keys: &EditorKeys) -> Option<Composed> {
    compose_key_prefix(
        EDITOR_TYPE_PREFIX,
        &[keys.editor_type.map(EditorType::as_str), keys.user_id.as_deref()],
    )
}

fn destruct_editor_type(raw: &str) -> Option<EditorKeys> {
    has_discriminator(raw, EDITOR_TYPE_PREFIX).then(|| EditorKeys {
        editor_type: destruct_key(raw, 1).and_then(EditorType::parse),
        user_id: destruct_key(raw, 2).map(String::from),
        ..EditorKeys::default()
    })
}

fn compose_editor_feature(keys: &EditorKeys) -> Option<Composed> {
    compose_feature_type_key(keys.feature_type, keys.feature_id.as_deref())
}

fn destruct_editor_feature(raw: &str) -> Option<EditorKeys> {
    let (feature_type, feature_id) = destruct_feature_type_key(raw)?;
    Some(EditorKeys {
        feature_id,
        feature_type,
        ..EditorKeys::default()
    })
}

pub static FEATURE_EDITOR: Transformer<EditorKeys, EditorAttrs> = Transformer::new(
    EntityKind::FeatureEditor,
    KeySchema {
        pk: Some(KeySlot {
            fields: &["featureId", "featureType"],
            discriminators: &[FEATURE_PREFIX],
            compose: compose_editor_pk,
            destruct: Some(destruct_editor_pk),
        }),
        sk_gsi: Some(KeySlot {
            fields: &["userId"],
            discriminators: &[EDITOR_PREFIX],
            compose: compose_editor_sk,
            destruct: Some(destruct_editor_sk),
        }),
        lsi: Some(KeySlot {
            fields: &["editorType", "userId"],
            discriminators: &[EDITOR_TYPE_PREFIX],
            compose: compose_editor_type,
            destruct: Some(destruct_editor_type),
        }),
        gsi_sk: Some(KeySlot {
            fields: &["featureType", "featureId"],
            discriminators: &[FEATURE_TYPE_PREFIX],
            compose: compose_editor_feature,
            destruct: Some(destruct_editor_feature),
        }),
        ..KeySchema::EMPTY
    },
    &KeyAttr::PRIMARY,
);

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::storage::FlatRecord;

    fn owner() -> FeatureEditor {
        Entity::new(
            EditorKeys::for_feature("abc123", FeatureType::Line)
                .with_user("u1")
                .with_editor_type(EditorType::Owner),
            EditorAttrs {
                created_date_time: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
                granted_by: None,
            },
        )
    }

    #[test]
    fn test_editor_record() {
        let record = FEATURE_EDITOR.item_to_attrs(&owner()).unwrap();
        assert_eq!(record["PK"], json!("feature:abc123:line"));
        assert_eq!(record["SK_GSI"], json!("editor:u1"));
        assert_eq!(record["LSI"], json!("editorType:owner:u1"));
        assert_eq!(record["GSI_SK"], json!("featureType:line:abc123"));
        assert!(!record.contains_key("grantedBy"));
    }

    #[test]
    fn test_editor_round_trip() {
        let item = owner();
        let record = FEATURE_EDITOR.item_to_attrs(&item).unwrap();
        assert_eq!(FEATURE_EDITOR.attrs_to_item(&record).unwrap(), item);
    }

    #[test]
    fn test_editor_without_type_skips_lsi() {
        let mut item = owner();
        item.keys.editor_type = None;
        let record = FEATURE_EDITOR.item_to_attrs(&item).unwrap();
        assert!(!record.contains_key("LSI"));
    }

    #[test]
    fn test_owner_prefix() {
        let keys = EditorKeys::for_feature("abc123", FeatureType::Line)
            .with_editor_type(EditorType::Owner);
        assert_eq!(
            FEATURE_EDITOR.compose(KeyAttr::Lsi, &keys),
            Some(Composed::Prefix("editorType:owner:".to_string()))
        );
    }

    #[test]
    fn test_user_side_keys() {
        let keys = EditorKeys::for_user("u1").with_type(FeatureType::Spot);
        assert_eq!(
            FEATURE_EDITOR.compose(KeyAttr::SkGsi, &keys),
            Some(Composed::Full("editor:u1".to_string()))
        );
        assert_eq!(
            FEATURE_EDITOR.compose(KeyAttr::GsiSk, &keys),
            Some(Composed::Prefix("featureType:spot:".to_string()))
        );
    }

    #[test]
    fn test_editor_key_value_matching() {
        let record = FEATURE_EDITOR.item_to_attrs(&owner()).unwrap();
        assert!(FEATURE_EDITOR.is_key_value_matching(&record, &EditorKeys::for_user("u1")));
        assert!(!FEATURE_EDITOR.is_key_value_matching(&record, &EditorKeys::for_user("u2")));
        assert!(!FEATURE_EDITOR.is_key_value_matching(
            &record,
            &EditorKeys::for_feature("abc123", FeatureType::Spot)
        ));
    }

    #[test]
    fn test_truncated_editor_keys_are_not_editors() {
        let cases = [
            ("feature", "editor"),
            ("feature:abc123", "editor:u1"),
            ("feature:abc123:line", "editor"),
            ("feature:abc123:boat", "editor:u1"),
        ];
        for (pk, sk) in cases {
            let record: FlatRecord = [
                ("PK".to_string(), json!(pk)),
                ("SK_GSI".to_string(), json!(sk)),
            ]
            .into_iter()
            .collect();
            assert!(
                !FEATURE_EDITOR.is_record_type_matching(&record),
                "{pk} / {sk} matched"
            );
        }
    }
}
