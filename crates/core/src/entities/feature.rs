use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keys::{compose_key_prefix, destruct_key, has_discriminator, Composed};

pub const FEATURE_PREFIX: &str = "feature";
pub const FEATURE_TYPE_PREFIX: &str = "featureType";

/// The kinds of map feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Line,
    Spot,
    Guide,
}

impl FeatureType {
    pub const ALL: [FeatureType; 3] = [FeatureType::Line, FeatureType::Spot, FeatureType::Guide];

    pub const fn as_str(self) -> &'static str {
        match self {
            FeatureType::Line => "line",
            FeatureType::Spot => "spot",
            FeatureType::Guide => "guide",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "line" => Some(FeatureType::Line),
            "spot" => Some(FeatureType::Spot),
            "guide" => Some(FeatureType::Guide),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partition key shared by every item hanging off a feature.
///
/// Pattern: `feature:<feature_id>:<feature_type>`
pub fn compose_feature_pk(
    feature_id: Option<&str>,
    feature_type: Option<FeatureType>,
) -> Option<Composed> {
    compose_key_prefix(
        FEATURE_PREFIX,
        &[feature_id, feature_type.map(FeatureType::as_str)],
    )
}

/// Inverse of [`compose_feature_pk`].
pub fn destruct_feature_pk(raw: &str) -> Option<(Option<String>, Option<FeatureType>)> {
    if !has_discriminator(raw, FEATURE_PREFIX) {
        return None;
    }
    Some((
        destruct_key(raw, 1).map(String::from),
        destruct_key(raw, 2).and_then(FeatureType::parse),
    ))
}

/// Grouping key for features of one type.
///
/// Pattern: `featureType:<feature_type>:<feature_id>`
pub fn compose_feature_type_key(
    feature_type: Option<FeatureType>,
    feature_id: Option<&str>,
) -> Option<Composed> {
    compose_key_prefix(
        FEATURE_TYPE_PREFIX,
        &[feature_type.map(FeatureType::as_str), feature_id],
    )
}

/// Inverse of [`compose_feature_type_key`].
pub fn destruct_feature_type_key(raw: &str) -> Option<(Option<FeatureType>, Option<String>)> {
    if !has_discriminator(raw, FEATURE_TYPE_PREFIX) {
        return None;
    }
    Some((
        destruct_key(raw, 1).and_then(FeatureType::parse),
        destruct_key(raw, 2).map(String::from),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_type_round_trip() {
        for feature_type in FeatureType::ALL {
            assert_eq!(FeatureType::parse(feature_type.as_str()), Some(feature_type));
        }
        assert_eq!(FeatureType::parse("area"), None);
    }

    #[test]
    fn test_feature_type_serde() {
        assert_eq!(
            serde_json::to_string(&FeatureType::Guide).unwrap(),
            "\"guide\""
        );
    }

    #[test]
    fn test_feature_pk() {
        let pk = compose_feature_pk(Some("abc123"), Some(FeatureType::Line)).unwrap();
        assert_eq!(pk, Composed::Full("feature:abc123:line".to_string()));
        assert_eq!(
            destruct_feature_pk(pk.as_str()),
            Some((Some("abc123".to_string()), Some(FeatureType::Line)))
        );
        assert_eq!(destruct_feature_pk("featureType:line:abc"), None);
    }

    #[test]
    fn test_feature_pk_prefix() {
        assert_eq!(
            compose_feature_pk(Some("abc123"), None),
            Some(Composed::Prefix("feature:abc123:".to_string()))
        );
    }

    #[test]
    fn test_feature_type_key() {
        let key = compose_feature_type_key(Some(FeatureType::Spot), Some("s1")).unwrap();
        assert_eq!(key.as_str(), "featureType:spot:s1");
        assert_eq!(
            destruct_feature_type_key(key.as_str()),
            Some((Some(FeatureType::Spot), Some("s1".to_string())))
        );
        assert_eq!(
            compose_feature_type_key(Some(FeatureType::Spot), None),
            Some(Composed::Prefix("featureType:spot:".to_string()))
        );
    }
}
