//! Feature changelog entries.
//!
//! Changelog items live in their feature's partition, sorted by date, and are also
//! reachable per country (`GSI2`), per user (`GSI3`) and per user within a feature
//! (`LSI2`). The date is always the last key segment, so it may contain `:`.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::{
    compose_key_prefix, destruct_key, destruct_key_tail, field_matches, has_discriminator,
    merge_field, Composed, KeyAttr, KeyFields, KeySchema, KeySlot,
};
use crate::transform::{Entity, Transformer};

use super::country::{compose_country, destruct_country, COUNTRY_PREFIX};
use super::feature::{compose_feature_pk, destruct_feature_pk, FeatureType, FEATURE_PREFIX};
use super::EntityKind;

pub const CHANGELOG_PREFIX: &str = "changelog";
pub const CHANGELOG_USER_PREFIX: &str = "changelogUser";
pub const USER_PREFIX: &str = "user";

/// Format a timestamp the way changelog keys store it.
///
/// Fixed millisecond precision keeps lexicographic and chronological order aligned.
pub fn changelog_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Key fields of a changelog entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangelogKeys {
    pub feature_id: Option<String>,
    pub feature_type: Option<FeatureType>,
    pub changelog_date: Option<String>,
    pub country_code: Option<String>,
    pub user_id: Option<String>,
}

impl ChangelogKeys {
    /// Keys addressing every changelog entry of a feature.
    pub fn for_feature(feature_id: impl Into<String>, feature_type: FeatureType) -> Self {
        Self {
            feature_id: Some(feature_id.into()),
            feature_type: Some(feature_type),
            ..Self::default()
        }
    }

    pub fn with_date(mut self, changelog_date: impl Into<String>) -> Self {
        self.changelog_date = Some(changelog_date.into());
        self
    }

    pub fn with_country(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

impl KeyFields for ChangelogKeys {
    fn merge(&mut self, other: Self) {
        merge_field(&mut self.feature_id, other.feature_id);
        merge_field(&mut self.feature_type, other.feature_type);
        merge_field(&mut self.changelog_date, other.changelog_date);
        merge_field(&mut self.country_code, other.country_code);
        merge_field(&mut self.user_id, other.user_id);
    }

    fn matches(&self, expected: &Self) -> bool {
        field_matches(&self.feature_id, &expected.feature_id)
            && field_matches(&self.feature_type, &expected.feature_type)
            && field_matches(&self.changelog_date, &expected.changelog_date)
            && field_matches(&self.country_code, &expected.country_code)
            && field_matches(&self.user_id, &expected.user_id)
    }

    fn identifiers(&self) -> Vec<(&'static str, &str)> {
        [
            ("featureId", self.feature_id.as_deref()),
            ("countryCode", self.country_code.as_deref()),
            ("userId", self.user_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

/// What happened to the feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangelogAction {
    Created,
    Updated,
    Deleted,
    GrantedEditor,
    RevokedEditor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangelogAttrs {
    pub action_type: ChangelogAction,
    pub html_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub updated_paths: Vec<String>,
}

pub type FeatureChangelog = Entity<ChangelogKeys, ChangelogAttrs>;

fn compose_changelog_pk(keys: &ChangelogKeys) -> Option<Composed> {
    compose_feature_pk(keys.feature_id.as_deref(), keys.feature_type)
}

fn destruct_changelog_pk(raw: &str) -> Option<ChangelogKeys> {
    let (feature_id, feature_type) = destruct_feature_pk(raw)?;
    Some(ChangelogKeys {
        feature_id,
        feature_type,
        ..ChangelogKeys::default()
    })
}

/// Pattern: `changelog:<date>`
fn compose_changelog_date(keys: &ChangelogKeys) -> Option<Composed> {
    compose_key_prefix(CHANGELOG_PREFIX, &[keys.changelog_date.as_deref()])
}

fn destruct_changelog_date(raw: &str) -> Option<ChangelogKeys> {
    has_discriminator(raw, CHANGELOG_PREFIX).then(|| ChangelogKeys {
        changelog_date: destruct_key_tail(raw, 1).map(String::from),
        ..ChangelogKeys::default()
    })
}

/// Pattern: `changelogUser:<user_id>:<date>`
fn compose_changelog_user(keys: &ChangelogKeys) -> Option<Composed> {
    compose_key_prefix(
        CHANGELOG_USER_PREFIX,
        &[keys.user_id.as_deref(), keys.changelog_date.as_deref()],
    )
}

fn destruct_changelog_user(raw: &str) -> Option<ChangelogKeys> {
    has_discriminator(raw, CHANGELOG_USER_PREFIX).then(|| ChangelogKeys {
        user_id: destruct_key(raw, 1).map(String::from),
        changelog_date: destruct_key_tail(raw, 2).map(String::from),
        ..ChangelogKeys::default()
    })
}

fn compose_changelog_country(keys: &ChangelogKeys) -> Option<Composed> {
    compose_country(keys.country_code.as_deref())
}

fn destruct_changelog_country(raw: &str) -> Option<ChangelogKeys> {
    has_discriminator(raw, COUNTRY_PREFIX).then(|| ChangelogKeys {
        country_code: destruct_country(raw),
        ..ChangelogKeys::default()
    })
}

/// `GSI2_SK`, written only alongside a complete `GSI2`.
fn compose_changelog_country_date(keys: &ChangelogKeys) -> Option<Composed> {
    compose_changelog_country(keys)?.into_full()?;
    compose_changelog_date(keys)
}

/// Pattern: `user:<user_id>`
fn compose_changelog_owner(keys: &ChangelogKeys) -> Option<Composed> {
    compose_key_prefix(USER_PREFIX, &[keys.user_id.as_deref()])
}

fn destruct_changelog_owner(raw: &str) -> Option<ChangelogKeys> {
    has_discriminator(raw, USER_PREFIX).then(|| ChangelogKeys {
        user_id: destruct_key(raw, 1).map(String::from),
        ..ChangelogKeys::default()
    })
}

/// `GSI3_SK`, written only alongside a complete `GSI3`.
fn compose_changelog_owner_date(keys: &ChangelogKeys) -> Option<Composed> {
    compose_changelog_owner(keys)?.into_full()?;
    compose_changelog_date(keys)
}

pub static FEATURE_CHANGELOG: Transformer<ChangelogKeys, ChangelogAttrs> = Transformer::new(
    EntityKind::FeatureChangelog,
    KeySchema {
        pk: Some(KeySlot {
            fields: &["featureId", "featureType"],
            discriminators: &[FEATURE_PREFIX],
            compose: compose_changelog_pk,
            destruct: Some(destruct_changelog_pk),
        }),
        sk_gsi: Some(KeySlot {
            fields: &["changelogDate"],
            discriminators: &[CHANGELOG_PREFIX],
            compose: compose_changelog_date,
            destruct: Some(destruct_changelog_date),
        }),
        lsi2: Some(KeySlot {
            fields: &["userId", "changelogDate"],
            discriminators: &[CHANGELOG_USER_PREFIX],
            compose: compose_changelog_user,
            destruct: Some(destruct_changelog_user),
        }),
        gsi2: Some(KeySlot {
            fields: &["countryCode"],
            discriminators: &[COUNTRY_PREFIX],
            compose: compose_changelog_country,
            destruct: Some(destruct_changelog_country),
        }),
        gsi2_sk: Some(KeySlot {
            fields: &["changelogDate"],
            discriminators: &[CHANGELOG_PREFIX],
            compose: compose_changelog_country_date,
            destruct: Some(destruct_changelog_date),
        }),
        gsi3: Some(KeySlot {
            fields: &["userId"],
            discriminators: &[USER_PREFIX],
            compose: compose_changelog_owner,
            destruct: Some(destruct_changelog_owner),
        }),
        gsi3_sk: Some(KeySlot {
            fields: &["changelogDate"],
            discriminators: &[CHANGELOG_PREFIX],
            compose: compose_changelog_owner_date,
            destruct: Some(destruct_changelog_date),
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
    use crate::keys::KeyError;
    use crate::transform::TransformError;

    fn changelog(user_id: Option<&str>, country_code: Option<&str>) -> FeatureChangelog {
        Entity::new(
            ChangelogKeys {
                feature_id: Some("abc123".to_string()),
                feature_type: Some(FeatureType::Line),
                changelog_date: Some("2024-01-01T00:00:00Z".to_string()),
                country_code: country_code.map(String::from),
                user_id: user_id.map(String::from),
            },
            ChangelogAttrs {
                action_type: ChangelogAction::Created,
                html_text: "<b>Line</b> created".to_string(),
                updated_paths: Vec::new(),
            },
        )
    }

    #[test]
    fn test_changelog_keys_example() {
        let record = FEATURE_CHANGELOG
            .item_to_attrs(&changelog(None, None))
            .unwrap();
        let pk = record["PK"].as_str().unwrap();
        let sk = record["SK_GSI"].as_str().unwrap();

        assert_eq!(pk, "feature:abc123:line");
        assert_eq!(sk, "changelog:2024-01-01T00:00:00Z");
        assert_eq!(destruct_key(pk, 1), Some("abc123"));
        assert_eq!(destruct_key(pk, 2), Some("line"));
        assert_eq!(destruct_key_tail(sk, 1), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_changelog_secondary_attributes() {
        let record = FEATURE_CHANGELOG
            .item_to_attrs(&changelog(Some("u1"), Some("pl")))
            .unwrap();
        assert_eq!(record["LSI2"], json!("changelogUser:u1:2024-01-01T00:00:00Z"));
        assert_eq!(record["GSI2"], json!("country:pl"));
        assert_eq!(record["GSI2_SK"], json!("changelog:2024-01-01T00:00:00Z"));
        assert_eq!(record["GSI3"], json!("user:u1"));
        assert_eq!(record["GSI3_SK"], json!("changelog:2024-01-01T00:00:00Z"));
        assert_eq!(record["actionType"], json!("created"));
        assert!(!record.contains_key("updatedPaths"));
    }

    #[test]
    fn test_changelog_sparse_attributes() {
        let record = FEATURE_CHANGELOG
            .item_to_attrs(&changelog(None, None))
            .unwrap();
        for attr in ["LSI2", "GSI2", "GSI2_SK", "GSI3", "GSI3_SK", "LSI", "GSI_SK"] {
            assert!(!record.contains_key(attr), "{attr} should be absent");
        }
        assert_eq!(record["SK_GSI"], json!("changelog:2024-01-01T00:00:00Z"));

        let record = FEATURE_CHANGELOG
            .item_to_attrs(&changelog(Some("u1"), None))
            .unwrap();
        assert!(!record.contains_key("GSI2_SK"));
        assert_eq!(record["GSI3"], json!("user:u1"));
        assert_eq!(record["GSI3_SK"], json!("changelog:2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_changelog_round_trip() {
        for item in [
            changelog(None, None),
            changelog(Some("u1"), None),
            changelog(Some("u1"), Some("pl")),
        ] {
            let record = FEATURE_CHANGELOG.item_to_attrs(&item).unwrap();
            assert_eq!(FEATURE_CHANGELOG.attrs_to_item(&record).unwrap(), item);
        }
    }

    #[test]
    fn test_changelog_prefix_stability() {
        let feature = ChangelogKeys::for_feature("abc123", FeatureType::Line);
        let prefix = FEATURE_CHANGELOG.compose(KeyAttr::SkGsi, &feature).unwrap();
        let full = FEATURE_CHANGELOG
            .compose(KeyAttr::SkGsi, &feature.clone().with_date("2024-01-01T00:00:00Z"))
            .unwrap();
        assert_eq!(prefix, Composed::Prefix("changelog:".to_string()));
        assert!(full.as_str().starts_with(prefix.as_str()));

        let by_user = feature.with_user("u1");
        let user_prefix = FEATURE_CHANGELOG.compose(KeyAttr::Lsi2, &by_user).unwrap();
        assert_eq!(user_prefix.as_str(), "changelogUser:u1:");
    }

    #[test]
    fn test_changelog_key_requires_date() {
        let keys = ChangelogKeys::for_feature("abc123", FeatureType::Line);
        assert_eq!(
            FEATURE_CHANGELOG.key(&keys),
            Err(TransformError::Key(KeyError::Incomplete {
                entity: "FeatureChangelog",
                attr: KeyAttr::SkGsi,
            }))
        );
    }

    #[test]
    fn test_changelog_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 30, 0).unwrap();
        assert_eq!(changelog_timestamp(at), "2024-01-01T12:30:00.000Z");
    }
}
