//! DynamoDB attribute conversion functions.
//!
//! Pure functions converting between DynamoDB `AttributeValue` maps and the JSON
//! records the transform engine works with. Testable without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::AttributeValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Number, Value};

use slackmap_core::storage::{FlatRecord, RepositoryError};

pub type Item = HashMap<String, AttributeValue>;

/// Convert a record to a DynamoDB item.
pub fn record_to_item(record: &FlatRecord) -> Item {
    record
        .iter()
        .map(|(name, value)| (name.clone(), json_to_attribute(value)))
        .collect()
}

/// Convert a DynamoDB item to a record.
pub fn item_to_record(item: &Item) -> Result<FlatRecord, RepositoryError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), attribute_to_json(value)?)))
        .collect()
}

pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(values) => AttributeValue::L(values.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(name, value)| (name.clone(), json_to_attribute(value)))
                .collect(),
        ),
    }
}

/// Binary values come back as standard base64 strings.
pub fn attribute_to_json(value: &AttributeValue) -> Result<Value, RepositoryError> {
    match value {
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::N(n) => parse_number(n).map(Value::Number),
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::L(values) => values
            .iter()
            .map(attribute_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::M(map) => map
            .iter()
            .map(|(name, value)| Ok((name.clone(), attribute_to_json(value)?)))
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        AttributeValue::Ss(values) => Ok(Value::Array(
            values.iter().cloned().map(Value::String).collect(),
        )),
        AttributeValue::Ns(values) => values
            .iter()
            .map(|n| parse_number(n).map(Value::Number))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        AttributeValue::B(blob) => Ok(Value::String(encode_blob(blob))),
        AttributeValue::Bs(blobs) => Ok(Value::Array(
            blobs
                .iter()
                .map(|blob| Value::String(encode_blob(blob)))
                .collect(),
        )),
        other => Err(RepositoryError::InvalidData(format!(
            "Unsupported attribute value: {other:?}"
        ))),
    }
}

fn parse_number(raw: &str) -> Result<Number, RepositoryError> {
    if let Ok(n) = raw.parse::<i64>() {
        return Ok(Number::from(n));
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Ok(Number::from(n));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid number attribute: {raw}")))
}

fn encode_blob(blob: &Blob) -> String {
    STANDARD.encode(blob.as_ref())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_record() -> FlatRecord {
        let mut record = FlatRecord::new();
        record.insert("PK".to_string(), json!("line:l1"));
        record.insert("SK_GSI".to_string(), json!("lineDetails"));
        record.insert("length".to_string(), json!(87.5));
        record.insert("spotCount".to_string(), json!(3));
        record.insert("coordinates".to_string(), json!([[19.9, 49.2]]));
        record.insert("meta".to_string(), json!({ "verified": true, "note": null }));
        record
    }

    #[test]
    fn test_record_round_trip() {
        let record = sample_record();
        let item = record_to_item(&record);
        assert_eq!(item_to_record(&item).unwrap(), record);
    }

    #[test]
    fn test_item_has_string_keys() {
        let item = record_to_item(&sample_record());
        assert_eq!(item["PK"], AttributeValue::S("line:l1".to_string()));
        assert_eq!(item["spotCount"], AttributeValue::N("3".to_string()));
    }

    #[test]
    fn test_sets_and_binary() {
        assert_eq!(
            attribute_to_json(&AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]))
                .unwrap(),
            json!(["a", "b"])
        );
        assert_eq!(
            attribute_to_json(&AttributeValue::Ns(vec!["1".to_string(), "2.5".to_string()]))
                .unwrap(),
            json!([1, 2.5])
        );
        assert_eq!(
            attribute_to_json(&AttributeValue::B(Blob::new(b"hi".to_vec()))).unwrap(),
            json!("aGk=")
        );
    }

    #[test]
    fn test_invalid_number() {
        assert!(matches!(
            attribute_to_json(&AttributeValue::N("twelve".to_string())),
            Err(RepositoryError::InvalidData(_))
        ));
    }
}
