//! Change-stream decoding.
//!
//! A table change arrives as the changed item's primary key plus optional before and
//! after images. [`decode_stream_record`] routes it to the owning entity schema and
//! decodes both images into that entity's type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::entities::{
    match_record, CountryInfo, EntityKind, FeatureChangelog, FeatureEditor, GuideDetails,
    LineDetails, SpotDetails, COUNTRY_INFO, FEATURE_CHANGELOG, FEATURE_EDITOR, GUIDE_DETAILS,
    LINE_DETAILS, SPOT_DETAILS,
};
use crate::keys::KeyFields;
use crate::storage::FlatRecord;
use crate::transform::{Entity, TransformError, Transformer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Inserted,
    Modified,
    Removed,
}

/// One change captured from the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRecord {
    pub change: ChangeKind,
    /// Primary key of the changed item.
    pub keys: FlatRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<FlatRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<FlatRecord>,
}

/// A decoded change of one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent<T> {
    pub change: ChangeKind,
    pub before: Option<T>,
    pub after: Option<T>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityChange {
    CountryInfo(ChangeEvent<CountryInfo>),
    LineDetails(ChangeEvent<LineDetails>),
    SpotDetails(ChangeEvent<SpotDetails>),
    GuideDetails(ChangeEvent<GuideDetails>),
    FeatureEditor(ChangeEvent<FeatureEditor>),
    FeatureChangelog(ChangeEvent<FeatureChangelog>),
}

impl EntityChange {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityChange::CountryInfo(_) => EntityKind::CountryInfo,
            EntityChange::LineDetails(_) => EntityKind::LineDetails,
            EntityChange::SpotDetails(_) => EntityKind::SpotDetails,
            EntityChange::GuideDetails(_) => EntityKind::GuideDetails,
            EntityChange::FeatureEditor(_) => EntityKind::FeatureEditor,
            EntityChange::FeatureChangelog(_) => EntityKind::FeatureChangelog,
        }
    }

    pub fn change(&self) -> ChangeKind {
        match self {
            EntityChange::CountryInfo(event) => event.change,
            EntityChange::LineDetails(event) => event.change,
            EntityChange::SpotDetails(event) => event.change,
            EntityChange::GuideDetails(event) => event.change,
            EntityChange::FeatureEditor(event) => event.change,
            EntityChange::FeatureChangelog(event) => event.change,
        }
    }
}

/// Decode a stream record into a typed change.
///
/// Returns `Ok(None)` when no registered schema claims the record's keys.
pub fn decode_stream_record(record: &StreamRecord) -> Result<Option<EntityChange>, TransformError> {
    let Some(kind) = match_record(&record.keys) else {
        return Ok(None);
    };

    let change = match kind {
        EntityKind::CountryInfo => EntityChange::CountryInfo(decode_event(&COUNTRY_INFO, record)?),
        EntityKind::LineDetails => EntityChange::LineDetails(decode_event(&LINE_DETAILS, record)?),
        EntityKind::SpotDetails => EntityChange::SpotDetails(decode_event(&SPOT_DETAILS, record)?),
        EntityKind::GuideDetails => {
            EntityChange::GuideDetails(decode_event(&GUIDE_DETAILS, record)?)
        }
        EntityKind::FeatureEditor => {
            EntityChange::FeatureEditor(decode_event(&FEATURE_EDITOR, record)?)
        }
        EntityKind::FeatureChangelog => {
            EntityChange::FeatureChangelog(decode_event(&FEATURE_CHANGELOG, record)?)
        }
    };

    Ok(Some(change))
}

fn decode_event<K, A>(
    transformer: &Transformer<K, A>,
    record: &StreamRecord,
) -> Result<ChangeEvent<Entity<K, A>>, TransformError>
where
    K: KeyFields,
    A: Serialize + DeserializeOwned,
{
    let decode = |image: &Option<FlatRecord>| {
        image
            .as_ref()
            .map(|image| transformer.attrs_to_item(image))
            .transpose()
    };

    Ok(ChangeEvent {
        change: record.change,
        before: decode(&record.before)?,
        after: decode(&record.after)?,
    })
}
