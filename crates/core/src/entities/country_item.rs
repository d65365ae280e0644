use crate::storage::FlatRecord;
use crate::transform::TransformError;

use super::{
    EntityKind, FeatureChangelog, GuideDetails, LineDetails, SpotDetails, FEATURE_CHANGELOG,
    GUIDE_DETAILS, LINE_DETAILS, SPOT_DETAILS,
};

/// An item found in a country's `GSI2` partition.
#[derive(Debug, Clone, PartialEq)]
pub enum CountryItem {
    Line(LineDetails),
    Spot(SpotDetails),
    Guide(GuideDetails),
    Changelog(FeatureChangelog),
}

impl CountryItem {
    /// Decode a raw record by whichever schema claims it.
    ///
    /// Returns `Ok(None)` for records of any other shape.
    pub fn from_record(record: &FlatRecord) -> Result<Option<Self>, TransformError> {
        if LINE_DETAILS.is_record_type_matching(record) {
            return LINE_DETAILS.attrs_to_item(record).map(|i| Some(Self::Line(i)));
        }
        if SPOT_DETAILS.is_record_type_matching(record) {
            return SPOT_DETAILS.attrs_to_item(record).map(|i| Some(Self::Spot(i)));
        }
        if GUIDE_DETAILS.is_record_type_matching(record) {
            return GUIDE_DETAILS.attrs_to_item(record).map(|i| Some(Self::Guide(i)));
        }
        if FEATURE_CHANGELOG.is_record_type_matching(record) {
            return FEATURE_CHANGELOG
                .attrs_to_item(record)
                .map(|i| Some(Self::Changelog(i)));
        }
        Ok(None)
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            CountryItem::Line(_) => EntityKind::LineDetails,
            CountryItem::Spot(_) => EntityKind::SpotDetails,
            CountryItem::Guide(_) => EntityKind::GuideDetails,
            CountryItem::Changelog(_) => EntityKind::FeatureChangelog,
        }
    }
}
