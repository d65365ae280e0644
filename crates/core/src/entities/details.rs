//! Line, spot and guide details.
//!
//! Each feature has one details item in its own partition (`line:<id>`, `spot:<id>`,
//! `guide:<id>`). Details of a located feature are also indexed per country on `GSI2`
//! under `featureType:<type>:<id>`, which lets a country page be listed by type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keys::{
    compose_key_prefix, destruct_key, field_matches, has_discriminator, merge_field, Composed,
    KeyAttr, KeyFields, KeySchema, KeySlot,
};
use crate::transform::{Entity, Transformer};

use super::country::{compose_country, destruct_country, COUNTRY_PREFIX};
use super::feature::{
    compose_feature_type_key, destruct_feature_type_key, FeatureType, FEATURE_TYPE_PREFIX,
};
use super::EntityKind;

pub const LINE_DETAILS_TOKEN: &str = "lineDetails";
pub const SPOT_DETAILS_TOKEN: &str = "spotDetails";
pub const GUIDE_DETAILS_TOKEN: &str = "guideDetails";

/// Longitude, latitude.
pub type Coordinates = [f64; 2];

/// Key fields shared by the three details entities.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetailsKeys {
    pub feature_id: Option<String>,
    pub country_code: Option<String>,
}

impl DetailsKeys {
    pub fn new(feature_id: impl Into<String>) -> Self {
        Self {
            feature_id: Some(feature_id.into()),
            country_code: None,
        }
    }

    pub fn with_country(mut self, country_code: impl Into<String>) -> Self {
        self.country_code = Some(country_code.into());
        self
    }
}

impl KeyFields for DetailsKeys {
    fn merge(&mut self, other: Self) {
        merge_field(&mut self.feature_id, other.feature_id);
        merge_field(&mut self.country_code, other.country_code);
    }

    fn matches(&self, expected: &Self) -> bool {
        field_matches(&self.feature_id, &expected.feature_id)
            && field_matches(&self.country_code, &expected.country_code)
    }

    fn identifiers(&self) -> Vec<(&'static str, &str)> {
        [
            ("featureId", self.feature_id.as_deref()),
            ("countryCode", self.country_code.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field, v)))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineDetailsAttrs {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub line_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Anchor points, in order.
    #[serde(default)]
    pub coordinates: Vec<Coordinates>,
    pub creator_user_id: String,
    pub created_date_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotDetailsAttrs {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Outline of the spot.
    #[serde(default)]
    pub coordinates: Vec<Coordinates>,
    pub creator_user_id: String,
    pub created_date_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuideDetailsAttrs {
    pub guide_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub coordinates: Vec<Coordinates>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    pub creator_user_id: String,
    pub created_date_time: DateTime<Utc>,
}

pub type LineDetails = Entity<DetailsKeys, LineDetailsAttrs>;
pub type SpotDetails = Entity<DetailsKeys, SpotDetailsAttrs>;
pub type GuideDetails = Entity<DetailsKeys, GuideDetailsAttrs>;

/// Pattern: `<feature_type>:<feature_id>`
fn compose_details_pk(feature_type: FeatureType, keys: &DetailsKeys) -> Option<Composed> {
    compose_key_prefix(feature_type.as_str(), &[keys.feature_id.as_deref()])
}

fn destruct_details_pk(feature_type: FeatureType, raw: &str) -> Option<DetailsKeys> {
    has_discriminator(raw, feature_type.as_str()).then(|| DetailsKeys {
        feature_id: destruct_key(raw, 1).map(String::from),
        ..DetailsKeys::default()
    })
}

fn compose_details_type_key(feature_type: FeatureType, keys: &DetailsKeys) -> Option<Composed> {
    compose_feature_type_key(Some(feature_type), keys.feature_id.as_deref())
}

fn destruct_details_type_key(feature_type: FeatureType, raw: &str) -> Option<DetailsKeys> {
    let (parsed, feature_id) = destruct_feature_type_key(raw)?;
    (parsed == Some(feature_type)).then_some(DetailsKeys {
        feature_id,
        ..DetailsKeys::default()
    })
}

fn compose_details_country(keys: &DetailsKeys) -> Option<Composed> {
    compose_country(keys.country_code.as_deref())
}

fn destruct_details_country(raw: &str) -> Option<DetailsKeys> {
    has_discriminator(raw, COUNTRY_PREFIX).then(|| DetailsKeys {
        country_code: destruct_country(raw),
        ..DetailsKeys::default()
    })
}

fn compose_line_pk(keys: &DetailsKeys) -> Option<Composed> {
    compose_details_pk(FeatureType::Line, keys)
}

fn destruct_line_pk(raw: &str) -> Option<DetailsKeys> {
    destruct_details_pk(FeatureType::Line, raw)
}

fn compose_line_sk(_: &DetailsKeys) -> Option<Composed> {
    Some(Composed::Full(LINE_DETAILS_TOKEN.to_string()))
}

fn compose_line_type_key(keys: &DetailsKeys) -> Option<Composed> {
    compose_details_type_key(FeatureType::Line, keys)
}

fn destruct_line_type_key(raw: &str) -> Option<DetailsKeys> {
    destruct_details_type_key(FeatureType::Line, raw)
}

fn compose_spot_pk(keys: &DetailsKeys) -> Option<Composed> {
    compose_details_pk(FeatureType::Spot, keys)
}

fn destruct_spot_pk(raw: &str) -> Option<DetailsKeys> {
    destruct_details_pk(FeatureType::Spot, raw)
}

fn compose_spot_sk(_: &DetailsKeys) -> Option<Composed> {
    Some(Composed::Full(SPOT_DETAILS_TOKEN.to_string()))
}

fn compose_spot_type_key(keys: &DetailsKeys) -> Option<Composed> {
    compose_details_type_key(FeatureType::Spot, keys)
}

fn destruct_spot_type_key(raw: &str) -> Option<DetailsKeys> {
    destruct_details_type_key(FeatureType::Spot, raw)
}

fn compose_guide_pk(keys: &DetailsKeys) -> Option<Composed> {
    compose_details_pk(FeatureType::Guide, keys)
}

fn destruct_guide_pk(raw: &str) -> Option<DetailsKeys> {
    destruct_details_pk(FeatureType::Guide, raw)
}

fn compose_guide_sk(_: &DetailsKeys) -> Option<Composed> {
    Some(Composed::Full(GUIDE_DETAILS_TOKEN.to_string()))
}

fn compose_guide_type_key(keys: &DetailsKeys) -> Option<Composed> {
    compose_details_type_key(FeatureType::Guide, keys)
}

fn destruct_guide_type_key(raw: &str) -> Option<DetailsKeys> {
    destruct_details_type_key(FeatureType::Guide, raw)
}

const DETAILS_COUNTRY_SLOT: KeySlot<DetailsKeys> = KeySlot {
    fields: &["countryCode"],
    discriminators: &[COUNTRY_PREFIX],
    compose: compose_details_country,
    destruct: Some(destruct_details_country),
};

pub static LINE_DETAILS: Transformer<DetailsKeys, LineDetailsAttrs> = Transformer::new(
    EntityKind::LineDetails,
    KeySchema {
        pk: Some(KeySlot {
            fields: &["lineId"],
            discriminators: &["line"],
            compose: compose_line_pk,
            destruct: Some(destruct_line_pk),
        }),
        sk_gsi: Some(KeySlot {
            fields: &[],
            discriminators: &[LINE_DETAILS_TOKEN],
            compose: compose_line_sk,
            destruct: None,
        }),
        gsi2: Some(DETAILS_COUNTRY_SLOT),
        gsi2_sk: Some(KeySlot {
            fields: &["lineId"],
            discriminators: &[FEATURE_TYPE_PREFIX],
            compose: compose_line_type_key,
            destruct: Some(destruct_line_type_key),
        }),
        ..KeySchema::EMPTY
    },
    &KeyAttr::PRIMARY,
);

pub static SPOT_DETAILS: Transformer<DetailsKeys, SpotDetailsAttrs> = Transformer::new(
    EntityKind::SpotDetails,
    KeySchema {
        pk: Some(KeySlot {
            fields: &["spotId"],
            discriminators: &["spot"],
            compose: compose_spot_pk,
            destruct: Some(destruct_spot_pk),
        }),
        sk_gsi: Some(KeySlot {
            fields: &[],
            discriminators: &[SPOT_DETAILS_TOKEN],
            compose: compose_spot_sk,
            destruct: None,
        }),
        gsi2: Some(DETAILS_COUNTRY_SLOT),
        gsi2_sk: Some(KeySlot {
            fields: &["spotId"],
            discriminators: &[FEATURE_TYPE_PREFIX],
            compose: compose_spot_type_key,
            destruct: Some(destruct_spot_type_key),
        }),
        ..KeySchema::EMPTY
    },
    &KeyAttr::PRIMARY,
);

pub static GUIDE_DETAILS: Transformer<DetailsKeys, GuideDetailsAttrs> = Transformer::new(
    EntityKind::GuideDetails,
    KeySchema {
        pk: Some(KeySlot {
            fields: &["guideId"],
            discriminators: &["guide"],
            compose: compose_guide_pk,
            destruct: Some(destruct_guide_pk),
        }),
        sk_gsi: Some(KeySlot {
            fields: &[],
            discriminators: &[GUIDE_DETAILS_TOKEN],
            compose: compose_guide_sk,
            destruct: None,
        }),
        gsi2: Some(DETAILS_COUNTRY_SLOT),
        gsi2_sk: Some(KeySlot {
            fields: &["guideId"],
            discriminators: &[FEATURE_TYPE_PREFIX],
            compose: compose_guide_type_key,
            destruct: Some(destruct_guide_type_key),
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

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 1, 8, 0, 0).unwrap()
    }

    fn line(country_code: Option<&str>) -> LineDetails {
        let keys = DetailsKeys::new("l1");
        let keys = match country_code {
            Some(code) => keys.with_country(code),
            None => keys,
        };
        Entity::new(
            keys,
            LineDetailsAttrs {
                name: "Gorge".to_string(),
                description: String::new(),
                line_type: "highline".to_string(),
                length: Some(87.5),
                height: None,
                coordinates: vec![[19.9, 49.2], [19.91, 49.21]],
                creator_user_id: "u1".to_string(),
                created_date_time: created(),
            },
        )
    }

    fn spot() -> SpotDetails {
        Entity::new(
            DetailsKeys::new("s1").with_country("pl"),
            SpotDetailsAttrs {
                name: "Quarry".to_string(),
                description: "Old quarry".to_string(),
                coordinates: vec![[19.0, 50.0]],
                creator_user_id: "u1".to_string(),
                created_date_time: created(),
            },
        )
    }

    #[test]
    fn test_line_details_record() {
        let record = LINE_DETAILS.item_to_attrs(&line(Some("pl"))).unwrap();
        assert_eq!(record["PK"], json!("line:l1"));
        assert_eq!(record["SK_GSI"], json!("lineDetails"));
        assert_eq!(record["GSI2"], json!("country:pl"));
        assert_eq!(record["GSI2_SK"], json!("featureType:line:l1"));
        assert_eq!(record["lineType"], json!("highline"));
        assert!(!record.contains_key("height"));
    }

    #[test]
    fn test_unlocated_line_has_no_country_index() {
        let record = LINE_DETAILS.item_to_attrs(&line(None)).unwrap();
        assert!(!record.contains_key("GSI2"));
        assert_eq!(record["GSI2_SK"], json!("featureType:line:l1"));
    }

    #[test]
    fn test_details_round_trip() {
        for item in [line(None), line(Some("pl"))] {
            let record = LINE_DETAILS.item_to_attrs(&item).unwrap();
            assert_eq!(LINE_DETAILS.attrs_to_item(&record).unwrap(), item);
        }

        let item = spot();
        let record = SPOT_DETAILS.item_to_attrs(&item).unwrap();
        assert_eq!(SPOT_DETAILS.attrs_to_item(&record).unwrap(), item);
    }

    #[test]
    fn test_null_attributes_read_as_absent() {
        let item = line(Some("pl"));
        let mut record = LINE_DETAILS.item_to_attrs(&item).unwrap();
        record.insert("description".to_string(), serde_json::Value::Null);
        record.insert("height".to_string(), serde_json::Value::Null);
        assert_eq!(LINE_DETAILS.attrs_to_item(&record).unwrap(), item);
    }

    #[test]
    fn test_details_are_told_apart() {
        let line_record = LINE_DETAILS.item_to_attrs(&line(Some("pl"))).unwrap();
        let spot_record = SPOT_DETAILS.item_to_attrs(&spot()).unwrap();

        assert!(LINE_DETAILS.is_record_type_matching(&line_record));
        assert!(!SPOT_DETAILS.is_record_type_matching(&line_record));
        assert!(!GUIDE_DETAILS.is_record_type_matching(&line_record));
        assert!(SPOT_DETAILS.is_record_type_matching(&spot_record));
        assert!(!LINE_DETAILS.is_record_type_matching(&spot_record));
    }

    #[test]
    fn test_type_key_rejects_other_types() {
        assert_eq!(destruct_line_type_key("featureType:spot:s1"), None);
        assert_eq!(
            destruct_spot_type_key("featureType:spot:s1"),
            Some(DetailsKeys::new("s1"))
        );
    }

    #[test]
    fn test_guide_key() {
        let key = GUIDE_DETAILS.key(&DetailsKeys::new("g1")).unwrap();
        assert_eq!(key["PK"], json!("guide:g1"));
        assert_eq!(key["SK_GSI"], json!("guideDetails"));
    }
}
