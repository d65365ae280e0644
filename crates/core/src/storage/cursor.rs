//! Opaque pagination cursors.
//!
//! A cursor is the continuation key of a page, serialized as JSON and encoded with
//! URL-safe base64 so it can travel through query strings untouched.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use thiserror::Error;

use super::FlatRecord;

/// Errors that can occur when decoding a cursor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CursorError {
    #[error("Invalid cursor encoding: {0}")]
    Encoding(String),
    #[error("Invalid cursor payload: {0}")]
    Payload(String),
}

/// An opaque continuation token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor(String);

impl Cursor {
    pub fn encode(key: &FlatRecord) -> Result<Self, CursorError> {
        let json = serde_json::to_vec(key).map_err(|e| CursorError::Payload(e.to_string()))?;
        Ok(Self(URL_SAFE_NO_PAD.encode(json)))
    }

    pub fn decode(&self) -> Result<FlatRecord, CursorError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(&self.0)
            .map_err(|e| CursorError::Encoding(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| CursorError::Payload(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Cursor {
    type Err = CursorError;

    /// Accepts any token that decodes to a continuation key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cursor = Self(s.to_string());
        cursor.decode()?;
        Ok(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_key() -> FlatRecord {
        let mut key = FlatRecord::new();
        key.insert("PK".to_string(), json!("feature:abc:line"));
        key.insert("SK_GSI".to_string(), json!("changelog:2024-01-01T00:00:00Z"));
        key
    }

    #[test]
    fn test_cursor_is_url_safe() {
        let cursor = Cursor::encode(&sample_key()).unwrap();
        assert!(cursor
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert_eq!(cursor.decode().unwrap(), sample_key());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "not base64!".parse::<Cursor>(),
            Err(CursorError::Encoding(_))
        ));

        let not_json = URL_SAFE_NO_PAD.encode("plain text");
        assert!(matches!(
            not_json.parse::<Cursor>(),
            Err(CursorError::Payload(_))
        ));
    }

    #[test]
    fn test_parse_accepts_encoded_cursor() {
        let cursor = Cursor::encode(&sample_key()).unwrap();
        let parsed: Cursor = cursor.to_string().parse().unwrap();
        assert_eq!(parsed, cursor);
    }
}
