//! The set of schemas sharing the table.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::keys::{KeyAttr, KeyFields, SchemaError};
use crate::storage::{FlatRecord, TableIndex};
use crate::transform::Transformer;

use super::{
    EntityKind, COUNTRY_INFO, FEATURE_CHANGELOG, FEATURE_EDITOR, GUIDE_DETAILS, LINE_DETAILS,
    SPOT_DETAILS,
};

/// Type-erased view of a [`Transformer`], enough to validate it and route raw records.
pub trait RegisteredSchema: Sync {
    fn kind(&self) -> EntityKind;

    fn validate(&self) -> Result<(), SchemaError>;

    /// Discriminator tokens the schema can emit for `attr`.
    fn discriminators(&self, attr: KeyAttr) -> &'static [&'static str];

    fn is_record_type_matching(&self, record: &FlatRecord) -> bool;
}

impl<K, A> RegisteredSchema for Transformer<K, A>
where
    K: KeyFields,
    A: Serialize + DeserializeOwned,
    Self: Sync,
{
    fn kind(&self) -> EntityKind {
        Transformer::kind(self)
    }

    fn validate(&self) -> Result<(), SchemaError> {
        self.schema()
            .validate(Transformer::kind(self).as_str(), self.primary())
    }

    fn discriminators(&self, attr: KeyAttr) -> &'static [&'static str] {
        self.schema()
            .slot(attr)
            .map(|slot| slot.discriminators)
            .unwrap_or_default()
    }

    fn is_record_type_matching(&self, record: &FlatRecord) -> bool {
        Transformer::is_record_type_matching(self, record)
    }
}

/// Every entity schema stored in the table.
pub fn registered_schemas() -> [&'static dyn RegisteredSchema; 6] {
    [
        &COUNTRY_INFO,
        &LINE_DETAILS,
        &SPOT_DETAILS,
        &GUIDE_DETAILS,
        &FEATURE_EDITOR,
        &FEATURE_CHANGELOG,
    ]
}

/// The entity a raw record belongs to, if any.
pub fn match_record(record: &FlatRecord) -> Option<EntityKind> {
    registered_schemas()
        .into_iter()
        .find(|schema| schema.is_record_type_matching(record))
        .map(|schema| schema.kind())
}

/// Validates every schema and checks that no two entities share a primary key shape.
pub fn validate_registry() -> Result<(), SchemaError> {
    let schemas = registered_schemas();

    for schema in &schemas {
        schema.validate()?;
    }

    for (i, first) in schemas.iter().enumerate() {
        for second in &schemas[i + 1..] {
            if let Some((pk, sk)) = shared_discriminators(*first, *second, TableIndex::Primary) {
                return Err(SchemaError::PrimaryCollision {
                    first: first.kind().as_str(),
                    second: second.kind().as_str(),
                    pk,
                    sk,
                });
            }
        }
    }

    Ok(())
}

/// The first partition and sort token pair both schemas can emit on `index`.
fn shared_discriminators(
    first: &dyn RegisteredSchema,
    second: &dyn RegisteredSchema,
    index: TableIndex,
) -> Option<(&'static str, &'static str)> {
    let common = |attr: KeyAttr| {
        first
            .discriminators(attr)
            .iter()
            .copied()
            .find(|token| second.discriminators(attr).contains(token))
    };
    let partition = common(index.partition_attr())?;
    let sort = common(index.sort_attr())?;
    Some((partition, sort))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::entities::{
        ChangelogAction, ChangelogAttrs, ChangelogKeys, CountryInfoAttrs, CountryKeys,
        DetailsKeys, EditorAttrs, EditorKeys, EditorType, FeatureType, GuideDetailsAttrs,
        LineDetailsAttrs, SpotDetailsAttrs,
    };
    use crate::transform::Entity;

    fn samples() -> Vec<(EntityKind, FlatRecord)> {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        vec![
            (
                EntityKind::CountryInfo,
                COUNTRY_INFO
                    .item_to_attrs(&Entity::new(
                        CountryKeys::new("pl"),
                        CountryInfoAttrs {
                            name: "Poland".to_string(),
                            line_count: 0,
                            spot_count: 0,
                            guide_count: 0,
                            updated_at: None,
                        },
                    ))
                    .unwrap(),
            ),
            (
                EntityKind::LineDetails,
                LINE_DETAILS
                    .item_to_attrs(&Entity::new(
                        DetailsKeys::new("x1").with_country("pl"),
                        LineDetailsAttrs {
                            name: "Line".to_string(),
                            description: String::new(),
                            line_type: "highline".to_string(),
                            length: None,
                            height: None,
                            coordinates: Vec::new(),
                            creator_user_id: "u1".to_string(),
                            created_date_time: at,
                        },
                    ))
                    .unwrap(),
            ),
            (
                EntityKind::SpotDetails,
                SPOT_DETAILS
                    .item_to_attrs(&Entity::new(
                        DetailsKeys::new("x1").with_country("pl"),
                        SpotDetailsAttrs {
                            name: "Spot".to_string(),
                            description: String::new(),
                            coordinates: Vec::new(),
                            creator_user_id: "u1".to_string(),
                            created_date_time: at,
                        },
                    ))
                    .unwrap(),
            ),
            (
                EntityKind::GuideDetails,
                GUIDE_DETAILS
                    .item_to_attrs(&Entity::new(
                        DetailsKeys::new("x1").with_country("pl"),
                        GuideDetailsAttrs {
                            guide_type: "accessInfo".to_string(),
                            description: String::new(),
                            coordinates: Vec::new(),
                            images: Vec::new(),
                            creator_user_id: "u1".to_string(),
                            created_date_time: at,
                        },
                    ))
                    .unwrap(),
            ),
            (
                EntityKind::FeatureEditor,
                FEATURE_EDITOR
                    .item_to_attrs(&Entity::new(
                        EditorKeys::for_feature("x1", FeatureType::Line)
                            .with_user("u1")
                            .with_editor_type(EditorType::Owner),
                        EditorAttrs {
                            created_date_time: at,
                            granted_by: None,
                        },
                    ))
                    .unwrap(),
            ),
            (
                EntityKind::FeatureChangelog,
                FEATURE_CHANGELOG
                    .item_to_attrs(&Entity::new(
                        ChangelogKeys::for_feature("x1", FeatureType::Line)
                            .with_date("2024-01-01T00:00:00.000Z")
                            .with_user("u1")
                            .with_country("pl"),
                        ChangelogAttrs {
                            action_type: ChangelogAction::Created,
                            html_text: "created".to_string(),
                            updated_paths: Vec::new(),
                        },
                    ))
                    .unwrap(),
            ),
        ]
    }

    #[test]
    fn test_registry_is_valid() {
        assert_eq!(validate_registry(), Ok(()));
    }

    #[test]
    fn test_registry_covers_every_kind() {
        let kinds: Vec<EntityKind> = registered_schemas().iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, EntityKind::ALL.to_vec());
    }

    #[test]
    fn test_only_the_owning_schema_matches() {
        for (kind, record) in samples() {
            for schema in registered_schemas() {
                assert_eq!(
                    schema.is_record_type_matching(&record),
                    schema.kind() == kind,
                    "{} against a {kind} record",
                    schema.kind()
                );
            }
            assert_eq!(match_record(&record), Some(kind));
        }
    }

    #[test]
    fn test_unknown_record_matches_nothing() {
        let mut record = FlatRecord::new();
        record.insert("PK".to_string(), "session:s1".into());
        record.insert("SK_GSI".to_string(), "session".into());
        assert_eq!(match_record(&record), None);
    }

    #[test]
    fn test_shared_partition_distinct_sort() {
        assert_eq!(
            shared_discriminators(&FEATURE_EDITOR, &FEATURE_CHANGELOG, TableIndex::Primary),
            None
        );
        assert_eq!(
            shared_discriminators(&FEATURE_EDITOR, &FEATURE_EDITOR, TableIndex::Primary),
            Some(("feature", "editor"))
        );
    }

    /// Details share `country`/`featureType` on `GSI2`; the type segment tells them apart.
    const COUNTRY_FEATURES: [EntityKind; 3] = [
        EntityKind::LineDetails,
        EntityKind::SpotDetails,
        EntityKind::GuideDetails,
    ];

    #[test]
    fn test_index_discriminators_are_distinct() {
        let schemas = registered_schemas();
        for index in TableIndex::ALL {
            for (i, first) in schemas.iter().enumerate() {
                for second in &schemas[i + 1..] {
                    let shared = shared_discriminators(*first, *second, index);
                    let country_features = index == TableIndex::Gsi2
                        && COUNTRY_FEATURES.contains(&first.kind())
                        && COUNTRY_FEATURES.contains(&second.kind());
                    let expected = country_features.then_some(("country", "featureType"));
                    assert_eq!(
                        shared,
                        expected,
                        "{} and {} on {index:?}",
                        first.kind(),
                        second.kind()
                    );
                }
            }
        }
    }

    #[test]
    fn test_index_keys_are_distinct_across_entities() {
        let samples = samples();
        for index in TableIndex::ALL {
            let partition = index.partition_attr().name();
            let sort = index.sort_attr().name();
            let keys: Vec<_> = samples
                .iter()
                .filter_map(|(kind, record)| {
                    Some((*kind, record.get(partition)?, record.get(sort)?))
                })
                .collect();

            for (i, (kind, p, s)) in keys.iter().enumerate() {
                for (other, op, os) in &keys[i + 1..] {
                    assert!(
                        (p, s) != (op, os),
                        "{kind} and {other} compose the same {index:?} key"
                    );
                }
            }
        }
    }
}
