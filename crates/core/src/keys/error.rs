use thiserror::Error;

use super::KeyAttr;

/// Contract violations raised while composing keys.
///
/// These are programming errors (insufficient or malformed key fields) and are never
/// retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("{entity}: key attribute {attr} cannot be composed from the supplied fields")]
    Incomplete {
        entity: &'static str,
        attr: KeyAttr,
    },
    #[error("key field {field} contains the key delimiter: {value:?}")]
    DelimiterInValue { field: &'static str, value: String },
}

/// Problems found when validating a key schema or a set of schemas.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{entity}: primary key attribute {attr} has no slot")]
    MissingPrimarySlot {
        entity: &'static str,
        attr: KeyAttr,
    },
    #[error("{entity}: slot {attr} declares no fields or discriminators")]
    EmptySlot {
        entity: &'static str,
        attr: KeyAttr,
    },
    #[error("{entity}: slot {attr} has an empty discriminator token")]
    EmptyDiscriminator {
        entity: &'static str,
        attr: KeyAttr,
    },
    #[error("{first} and {second} share the primary key discriminators {pk}/{sk}")]
    PrimaryCollision {
        first: &'static str,
        second: &'static str,
        pk: &'static str,
        sk: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_display() {
        let error = KeyError::Incomplete {
            entity: "FeatureChangelog",
            attr: KeyAttr::SkGsi,
        };
        assert_eq!(
            error.to_string(),
            "FeatureChangelog: key attribute SK_GSI cannot be composed from the supplied fields"
        );
    }

    #[test]
    fn test_delimiter_in_value_display() {
        let error = KeyError::DelimiterInValue {
            field: "featureId",
            value: "a:b".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "key field featureId contains the key delimiter: \"a:b\""
        );
    }

    #[test]
    fn test_primary_collision_display() {
        let error = SchemaError::PrimaryCollision {
            first: "SpotDetails",
            second: "LineDetails",
            pk: "spot",
            sk: "spotDetails",
        };
        assert_eq!(
            error.to_string(),
            "SpotDetails and LineDetails share the primary key discriminators spot/spotDetails"
        );
    }
}
