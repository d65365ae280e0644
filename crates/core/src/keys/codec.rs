//! Key codec.
//!
//! Pure functions for composing delimited key strings and reading segments back out.
//! All functions are sync and have no side effects.
//!
//! Segments are joined with [`DELIMITER`] and never escaped. Identifiers must therefore
//! not contain `:`. The final segment of a key is the only one allowed to contain the
//! delimiter (timestamps such as `2024-01-01T00:00:00Z`), and it must be read back with
//! [`destruct_key_tail`].

/// Separator between the discriminator token and every field value.
pub const DELIMITER: char = ':';

/// A composed key value.
///
/// `Full` keys carry every field the attribute declares and can be stored or matched
/// with equality. `Prefix` keys stop at the first missing field, end with the delimiter
/// and are only usable in `begins_with` conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Composed {
    Full(String),
    Prefix(String),
}

impl Composed {
    /// The composed string, regardless of completeness.
    pub fn as_str(&self) -> &str {
        match self {
            Composed::Full(s) | Composed::Prefix(s) => s,
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Composed::Full(_))
    }

    /// Returns the string only if the key is complete.
    pub fn into_full(self) -> Option<String> {
        match self {
            Composed::Full(s) => Some(s),
            Composed::Prefix(_) => None,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            Composed::Full(s) | Composed::Prefix(s) => s,
        }
    }
}

/// Join segments with the delimiter.
///
/// Pattern: `<segment>:<segment>:...`
pub fn compose_key(segments: &[&str]) -> String {
    let mut key = String::with_capacity(segments.iter().map(|s| s.len() + 1).sum());
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            key.push(DELIMITER);
        }
        key.push_str(segment);
    }
    key
}

/// Compose `<discriminator>:<value>:...` only when every value is present and non-empty.
///
/// Returns `None` otherwise, which callers treat as "this branch does not apply".
pub fn compose_key_strictly(discriminator: &str, values: &[Option<&str>]) -> Option<String> {
    if discriminator.is_empty() {
        return None;
    }
    let mut segments = Vec::with_capacity(values.len() + 1);
    segments.push(discriminator);
    for value in values {
        match value {
            Some(v) if !v.is_empty() => segments.push(v),
            _ => return None,
        }
    }
    Some(compose_key(&segments))
}

/// Compose as much of `<discriminator>:<value>:...` as the leading present values allow.
///
/// A complete key comes back as [`Composed::Full`]. If a value is missing or empty the
/// key stops there and comes back as [`Composed::Prefix`] with a trailing delimiter, so a
/// `begins_with` on `feature:abc:` cannot match `feature:abcdef:line`.
pub fn compose_key_prefix(discriminator: &str, values: &[Option<&str>]) -> Option<Composed> {
    if discriminator.is_empty() {
        return None;
    }
    let mut segments = Vec::with_capacity(values.len() + 1);
    segments.push(discriminator);
    for value in values {
        match value {
            Some(v) if !v.is_empty() => segments.push(v),
            _ => {
                let mut prefix = compose_key(&segments);
                prefix.push(DELIMITER);
                return Some(Composed::Prefix(prefix));
            }
        }
    }
    Some(Composed::Full(compose_key(&segments)))
}

/// Returns true if `key` is exactly `token` or starts with `token:`.
pub fn has_discriminator(key: &str, token: &str) -> bool {
    match key.strip_prefix(token) {
        Some(rest) => rest.is_empty() || rest.starts_with(DELIMITER),
        None => false,
    }
}

/// Return the segment at `position`. Position 0 is the discriminator token.
///
/// Returns `None` when the key has fewer segments or the segment is empty.
pub fn destruct_key(key: &str, position: usize) -> Option<&str> {
    key.split(DELIMITER)
        .nth(position)
        .filter(|segment| !segment.is_empty())
}

/// Return everything from the segment at `position` to the end of the key.
///
/// Used for the final field of a key when it may itself contain the delimiter.
pub fn destruct_key_tail(key: &str, position: usize) -> Option<&str> {
    key.splitn(position + 1, DELIMITER)
        .nth(position)
        .filter(|tail| !tail.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_key() {
        assert_eq!(
            compose_key(&["feature", "abc123", "line"]),
            "feature:abc123:line"
        );
        assert_eq!(compose_key(&["countryInfo"]), "countryInfo");
    }

    #[test]
    fn test_compose_key_strictly_all_present() {
        assert_eq!(
            compose_key_strictly("changelog", &[Some("2024-01-01T00:00:00Z")]),
            Some("changelog:2024-01-01T00:00:00Z".to_string())
        );
    }

    #[test]
    fn test_compose_key_strictly_rejects_missing_and_empty() {
        assert_eq!(compose_key_strictly("changelog", &[None]), None);
        assert_eq!(compose_key_strictly("changelog", &[Some("")]), None);
        assert_eq!(compose_key_strictly("feature", &[Some("a"), None]), None);
        assert_eq!(compose_key_strictly("", &[Some("a")]), None);
    }

    #[test]
    fn test_compose_key_prefix_full() {
        assert_eq!(
            compose_key_prefix("feature", &[Some("abc"), Some("line")]),
            Some(Composed::Full("feature:abc:line".to_string()))
        );
    }

    #[test]
    fn test_compose_key_prefix_partial() {
        assert_eq!(
            compose_key_prefix("feature", &[Some("abc"), None]),
            Some(Composed::Prefix("feature:abc:".to_string()))
        );
        assert_eq!(
            compose_key_prefix("feature", &[None, Some("line")]),
            Some(Composed::Prefix("feature:".to_string()))
        );
        assert_eq!(
            compose_key_prefix("feature", &[Some(""), Some("line")]),
            Some(Composed::Prefix("feature:".to_string()))
        );
    }

    #[test]
    fn test_prefix_is_string_prefix_of_full_key() {
        let full = compose_key_prefix("feature", &[Some("abc"), Some("line")]).unwrap();
        let prefix = compose_key_prefix("feature", &[Some("abc"), None]).unwrap();
        assert!(full.as_str().starts_with(prefix.as_str()));

        let other = compose_key_prefix("feature", &[Some("abcdef"), Some("line")]).unwrap();
        assert!(!other.as_str().starts_with(prefix.as_str()));
    }

    #[test]
    fn test_has_discriminator() {
        assert!(has_discriminator("feature:abc:line", "feature"));
        assert!(has_discriminator("countryInfo", "countryInfo"));
        assert!(!has_discriminator("featureType:line", "feature"));
        assert!(!has_discriminator("spot:1", "line"));
    }

    #[test]
    fn test_destruct_key_positions() {
        let pk = "feature:abc123:line";
        assert_eq!(destruct_key(pk, 0), Some("feature"));
        assert_eq!(destruct_key(pk, 1), Some("abc123"));
        assert_eq!(destruct_key(pk, 2), Some("line"));
        assert_eq!(destruct_key(pk, 3), None);
    }

    #[test]
    fn test_destruct_key_empty_segment() {
        assert_eq!(destruct_key("feature::line", 1), None);
        assert_eq!(destruct_key("feature:", 1), None);
    }

    #[test]
    fn test_destruct_key_tail_keeps_timestamp() {
        let sk = "changelog:2024-01-01T00:00:00Z";
        assert_eq!(destruct_key_tail(sk, 1), Some("2024-01-01T00:00:00Z"));
        assert_eq!(destruct_key(sk, 1), Some("2024-01-01T00"));

        let lsi2 = "changelogUser:user1:2024-01-01T00:00:00Z";
        assert_eq!(destruct_key(lsi2, 1), Some("user1"));
        assert_eq!(destruct_key_tail(lsi2, 2), Some("2024-01-01T00:00:00Z"));
        assert_eq!(destruct_key_tail("feature:abc", 2), None);
    }

    #[test]
    fn test_composed_accessors() {
        let full = Composed::Full("a:b".to_string());
        let prefix = Composed::Prefix("a:".to_string());
        assert!(full.is_full());
        assert!(!prefix.is_full());
        assert_eq!(full.clone().into_full(), Some("a:b".to_string()));
        assert_eq!(prefix.clone().into_full(), None);
        assert_eq!(prefix.into_string(), "a:");
    }
}
