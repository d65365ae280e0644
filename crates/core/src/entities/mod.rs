//! Entity key schemas.
//!
//! Every entity stored in the table gets a key-field struct, a non-key attribute struct
//! and a static [`Transformer`](crate::transform::Transformer) describing how its keys
//! are laid out over the physical key attributes.
//!
//! | Entity           | PK                         | SK_GSI             |
//! |------------------|----------------------------|--------------------|
//! | CountryInfo      | `country:<code>`           | `countryInfo`      |
//! | LineDetails      | `line:<id>`                | `lineDetails`      |
//! | SpotDetails      | `spot:<id>`                | `spotDetails`      |
//! | GuideDetails     | `guide:<id>`               | `guideDetails`     |
//! | FeatureEditor    | `feature:<id>:<type>`      | `editor:<userId>`  |
//! | FeatureChangelog | `feature:<id>:<type>`      | `changelog:<date>` |

mod changelog;
mod country;
mod country_item;
mod details;
mod editor;
mod feature;
mod registry;

use std::fmt;

pub use changelog::{
    changelog_timestamp, ChangelogAction, ChangelogAttrs, ChangelogKeys, FeatureChangelog,
    FEATURE_CHANGELOG,
};
pub use country::{
    CountryIndexKeys, CountryInfo, CountryInfoAttrs, CountryKeys, COUNTRY_INDEX, COUNTRY_INFO,
};
pub use country_item::CountryItem;
pub use details::{
    Coordinates, DetailsKeys, GuideDetails, GuideDetailsAttrs, LineDetails, LineDetailsAttrs,
    SpotDetails, SpotDetailsAttrs, GUIDE_DETAILS, LINE_DETAILS, SPOT_DETAILS,
};
pub use editor::{EditorAttrs, EditorKeys, EditorType, FeatureEditor, FEATURE_EDITOR};
pub use feature::FeatureType;
pub use registry::{match_record, registered_schemas, validate_registry, RegisteredSchema};

/// Discriminates the entity types sharing the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    CountryInfo,
    LineDetails,
    SpotDetails,
    GuideDetails,
    FeatureEditor,
    FeatureChangelog,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::CountryInfo,
        EntityKind::LineDetails,
        EntityKind::SpotDetails,
        EntityKind::GuideDetails,
        EntityKind::FeatureEditor,
        EntityKind::FeatureChangelog,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::CountryInfo => "CountryInfo",
            EntityKind::LineDetails => "LineDetails",
            EntityKind::SpotDetails => "SpotDetails",
            EntityKind::GuideDetails => "GuideDetails",
            EntityKind::FeatureEditor => "FeatureEditor",
            EntityKind::FeatureChangelog => "FeatureChangelog",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
