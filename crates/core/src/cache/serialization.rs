//! JSON encoding of cached values.
//!
//! Values are stored as JSON so cache contents stay readable when inspected.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Cache, CacheError, Result};

pub fn serialize_value<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| CacheError::Serialize(e.to_string()))
}

pub fn deserialize_value<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| CacheError::Deserialize(e.to_string()))
}

/// Reads and decodes a typed value.
pub async fn get_json<C, T>(cache: &C, key: &str) -> Result<Option<T>>
where
    C: Cache + ?Sized,
    T: DeserializeOwned,
{
    match cache.get(key).await? {
        Some(bytes) => deserialize_value(&bytes).map(Some),
        None => Ok(None),
    }
}

/// Encodes and stores a typed value.
pub async fn set_json<C, T>(cache: &C, key: &str, value: &T) -> Result<()>
where
    C: Cache + ?Sized,
    T: Serialize + ?Sized,
{
    let bytes = serialize_value(value)?;
    cache.set(key, &bytes).await
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Lookup {
        country_code: String,
    }

    #[test]
    fn test_roundtrip_value() {
        let value = Lookup {
            country_code: "pl".to_string(),
        };
        let bytes = serialize_value(&value).unwrap();
        assert_eq!(bytes, br#"{"country_code":"pl"}"#);
        assert_eq!(deserialize_value::<Lookup>(&bytes).unwrap(), value);
    }

    #[test]
    fn test_deserialize_invalid() {
        assert!(matches!(
            deserialize_value::<Lookup>(b"not json"),
            Err(CacheError::Deserialize(_))
        ));
    }
}
