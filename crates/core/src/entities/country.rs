//! Country rollups and the country index.
//!
//! `GSI2` partitions every country-scoped item by `country:<code>`. Within a country the
//! `GSI2_SK` value is either `changelog:<date>` (changelog entries, ordered by date) or
//! `featureType:<type>:<id>` (feature details, grouped by type).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::{
    compose_key_prefix, compose_key_strictly, destruct_key, destruct_key_tail, field_matches,
    has_discriminator, merge_field, Composed, KeyAttr, KeyFields, KeySchema, KeySlot,
};
use crate::transform::{Entity, Transformer};

use super::changelog::CHANGELOG_PREFIX;
use super::feature::{
    compose_feature_type_key, destruct_feature_type_key, FeatureType, FEATURE_TYPE_PREFIX,
};
use super::EntityKind;

pub const COUNTRY_PREFIX: &str = "country";
pub const COUNTRY_INFO_TOKEN: &str = "countryInfo";

/// Key fields of a country rollup.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountryKeys {
    pub country_code: Option<String>,
}

impl CountryKeys {
    pub fn new(country_code: impl Into<String>) -> Self {
        Self {
            country_code: Some(country_code.into()),
        }
    }
}

impl KeyFields for CountryKeys {
    fn merge(&mut self, other: Self) {
        merge_field(&mut self.country_code, other.country_code);
    }

    fn matches(&self, expected: &Self) -> bool {
        field_matches(&self.country_code, &expected.country_code)
    }

    fn identifiers(&self) -> Vec<(&'static str, &str)> {
        self.country_code
            .as_deref()
            .map(|code| ("countryCode", code))
            .into_iter()
            .collect()
    }
}

/// Per-country feature counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryInfoAttrs {
    pub name: String,
    #[serde(default)]
    pub line_count: u32,
    #[serde(default)]
    pub spot_count: u32,
    #[serde(default)]
    pub guide_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

pub type CountryInfo = Entity<CountryKeys, CountryInfoAttrs>;

/// Pattern: `country:<code>`
pub(crate) fn compose_country(country_code: Option<&str>) -> Option<Composed> {
    compose_key_prefix(COUNTRY_PREFIX, &[country_code])
}

pub(crate) fn destruct_country(raw: &str) -> Option<String> {
    if !has_discriminator(raw, COUNTRY_PREFIX) {
        return None;
    }
    destruct_key(raw, 1).map(String::from)
}

fn compose_country_info_pk(keys: &CountryKeys) -> Option<Composed> {
    compose_country(keys.country_code.as_deref())
}

fn destruct_country_info_pk(raw: &str) -> Option<CountryKeys> {
    has_discriminator(raw, COUNTRY_PREFIX).then(|| CountryKeys {
        country_code: destruct_country(raw),
    })
}

fn compose_country_info_sk(_: &CountryKeys) -> Option<Composed> {
    Some(Composed::Full(COUNTRY_INFO_TOKEN.to_string()))
}

pub static COUNTRY_INFO: Transformer<CountryKeys, CountryInfoAttrs> = Transformer::new(
    EntityKind::CountryInfo,
    KeySchema {
        pk: Some(KeySlot {
            fields: &["countryCode"],
            discriminators: &[COUNTRY_PREFIX],
            compose: compose_country_info_pk,
            destruct: Some(destruct_country_info_pk),
        }),
        sk_gsi: Some(KeySlot {
            fields: &[],
            discriminators: &[COUNTRY_INFO_TOKEN],
            compose: compose_country_info_sk,
            destruct: None,
        }),
        gsi_sk: Some(KeySlot {
            fields: &["countryCode"],
            discriminators: &[COUNTRY_PREFIX],
            compose: compose_country_info_pk,
            destruct: Some(destruct_country_info_pk),
        }),
        ..KeySchema::EMPTY
    },
    &KeyAttr::PRIMARY,
);

/// Key fields for querying `GSI2` across entity types.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountryIndexKeys {
    pub country_code: Option<String>,
    pub changelog_date: Option<String>,
    pub feature_type: Option<FeatureType>,
    pub feature_id: Option<String>,
}

impl CountryIndexKeys {
    /// The `GSI2` partition value.
    pub fn partition(&self) -> Option<Composed> {
        COUNTRY_INDEX
            .gsi2
            .as_ref()
            .and_then(|slot| (slot.compose)(self))
    }

    /// The `GSI2_SK` value or prefix.
    pub fn sort(&self) -> Option<Composed> {
        COUNTRY_INDEX
            .gsi2_sk
            .as_ref()
            .and_then(|slot| (slot.compose)(self))
    }
}

impl KeyFields for CountryIndexKeys {
    fn merge(&mut self, other: Self) {
        merge_field(&mut self.country_code, other.country_code);
        merge_field(&mut self.changelog_date, other.changelog_date);
        merge_field(&mut self.feature_type, other.feature_type);
        merge_field(&mut self.feature_id, other.feature_id);
    }

    fn matches(&self, expected: &Self) -> bool {
        field_matches(&self.country_code, &expected.country_code)
            && field_matches(&self.changelog_date, &expected.changelog_date)
            && field_matches(&self.feature_type, &expected.feature_type)
            && field_matches(&self.feature_id, &expected.feature_id)
    }

    fn identifiers(&self) -> Vec<(&'static str, &str)> {
        let mut ids = Vec::new();
        if let Some(code) = self.country_code.as_deref() {
            ids.push(("countryCode", code));
        }
        if let Some(id) = self.feature_id.as_deref() {
            ids.push(("featureId", id));
        }
        ids
    }
}

fn compose_country_index_pk(keys: &CountryIndexKeys) -> Option<Composed> {
    compose_country(keys.country_code.as_deref())
}

fn destruct_country_index_pk(raw: &str) -> Option<CountryIndexKeys> {
    has_discriminator(raw, COUNTRY_PREFIX).then(|| CountryIndexKeys {
        country_code: destruct_country(raw),
        ..CountryIndexKeys::default()
    })
}

/// A changelog date selects the changelog branch; otherwise the feature-type branch.
fn compose_country_index_sk(keys: &CountryIndexKeys) -> Option<Composed> {
    if let Some(key) = compose_key_strictly(CHANGELOG_PREFIX, &[keys.changelog_date.as_deref()]) {
        return Some(Composed::Full(key));
    }
    compose_feature_type_key(keys.feature_type, keys.feature_id.as_deref())
}

fn destruct_country_index_sk(raw: &str) -> Option<CountryIndexKeys> {
    if has_discriminator(raw, CHANGELOG_PREFIX) {
        return Some(CountryIndexKeys {
            changelog_date: destruct_key_tail(raw, 1).map(String::from),
            ..CountryIndexKeys::default()
        });
    }
    let (feature_type, feature_id) = destruct_feature_type_key(raw)?;
    Some(CountryIndexKeys {
        feature_type,
        feature_id,
        ..CountryIndexKeys::default()
    })
}

/// Query-side view of `GSI2` shared by feature details and changelogs.
pub static COUNTRY_INDEX: KeySchema<CountryIndexKeys> = KeySchema {
    gsi2: Some(KeySlot {
        fields: &["countryCode"],
        discriminators: &[COUNTRY_PREFIX],
        compose: compose_country_index_pk,
        destruct: Some(destruct_country_index_pk),
    }),
    gsi2_sk: Some(KeySlot {
        fields: &["changelogDate", "featureType", "featureId"],
        discriminators: &[CHANGELOG_PREFIX, FEATURE_TYPE_PREFIX],
        compose: compose_country_index_sk,
        destruct: Some(destruct_country_index_sk),
    }),
    ..KeySchema::EMPTY
};
