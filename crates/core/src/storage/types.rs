use std::collections::BTreeMap;

use serde_json::Value;

use crate::keys::{Composed, KeyAttr};

use super::{Cursor, CursorError, RepositoryError};

/// A stored item: attribute name to value, key and non-key attributes side by side.
pub type FlatRecord = BTreeMap<String, Value>;

/// Read a string attribute from a record.
pub fn record_str<'a>(record: &'a FlatRecord, attr: KeyAttr) -> Option<&'a str> {
    record.get(attr.name()).and_then(Value::as_str)
}

/// The indexes of the table and the key attributes each one is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableIndex {
    Primary,
    Lsi,
    Lsi2,
    Gsi,
    Gsi2,
    Gsi3,
}

impl TableIndex {
    pub const ALL: [TableIndex; 6] = [
        TableIndex::Primary,
        TableIndex::Lsi,
        TableIndex::Lsi2,
        TableIndex::Gsi,
        TableIndex::Gsi2,
        TableIndex::Gsi3,
    ];

    /// Index name to pass to the store, `None` for the table itself.
    pub const fn index_name(self) -> Option<&'static str> {
        match self {
            TableIndex::Primary => None,
            TableIndex::Lsi => Some("LSI"),
            TableIndex::Lsi2 => Some("LSI2"),
            TableIndex::Gsi => Some("GSI"),
            TableIndex::Gsi2 => Some("GSI2"),
            TableIndex::Gsi3 => Some("GSI3"),
        }
    }

    pub const fn partition_attr(self) -> KeyAttr {
        match self {
            TableIndex::Primary | TableIndex::Lsi | TableIndex::Lsi2 => KeyAttr::Pk,
            TableIndex::Gsi => KeyAttr::SkGsi,
            TableIndex::Gsi2 => KeyAttr::Gsi2,
            TableIndex::Gsi3 => KeyAttr::Gsi3,
        }
    }

    pub const fn sort_attr(self) -> KeyAttr {
        match self {
            TableIndex::Primary => KeyAttr::SkGsi,
            TableIndex::Lsi => KeyAttr::Lsi,
            TableIndex::Lsi2 => KeyAttr::Lsi2,
            TableIndex::Gsi => KeyAttr::GsiSk,
            TableIndex::Gsi2 => KeyAttr::Gsi2Sk,
            TableIndex::Gsi3 => KeyAttr::Gsi3Sk,
        }
    }

    /// Attributes making up a continuation key for this index.
    pub fn cursor_attrs(self) -> Vec<KeyAttr> {
        let mut attrs = vec![KeyAttr::Pk, KeyAttr::SkGsi];
        for attr in [self.partition_attr(), self.sort_attr()] {
            if !attrs.contains(&attr) {
                attrs.push(attr);
            }
        }
        attrs
    }
}

/// Condition on the sort key of the queried index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortCondition {
    Equals(String),
    BeginsWith(String),
}

impl SortCondition {
    /// Equality needs a complete key.
    pub fn equals(key: Composed) -> Result<Self, RepositoryError> {
        match key {
            Composed::Full(key) => Ok(SortCondition::Equals(key)),
            Composed::Prefix(prefix) => Err(RepositoryError::InvalidData(format!(
                "Equality condition needs a complete key, got prefix {prefix}"
            ))),
        }
    }

    /// Prefix match on a full or partial key.
    pub fn begins_with(key: Composed) -> Self {
        SortCondition::BeginsWith(key.into_string())
    }

    /// Returns true if a stored sort key value satisfies the condition.
    pub fn is_satisfied_by(&self, value: &str) -> bool {
        match self {
            SortCondition::Equals(expected) => value == expected,
            SortCondition::BeginsWith(prefix) => value.starts_with(prefix.as_str()),
        }
    }
}

/// A single key-condition query against one index.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub index: TableIndex,
    /// Exact value of the index's partition attribute.
    pub partition: String,
    pub sort: Option<SortCondition>,
    pub exclusive_start_key: Option<FlatRecord>,
    pub limit: Option<u32>,
    /// Ascending when true.
    pub scan_forward: bool,
}

impl QueryRequest {
    pub fn new(index: TableIndex, partition: impl Into<String>) -> Self {
        Self {
            index,
            partition: partition.into(),
            sort: None,
            exclusive_start_key: None,
            limit: None,
            scan_forward: true,
        }
    }

    pub fn with_sort(mut self, sort: SortCondition) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_start_key(mut self, start_key: Option<FlatRecord>) -> Self {
        self.exclusive_start_key = start_key;
        self
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_scan_forward(mut self, scan_forward: bool) -> Self {
        self.scan_forward = scan_forward;
        self
    }
}

/// One page of raw query results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub items: Vec<FlatRecord>,
    pub last_evaluated_key: Option<FlatRecord>,
}

/// A single batch write operation.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteRequest {
    Put(FlatRecord),
    /// Carries the item's primary key.
    Delete(FlatRecord),
}

/// Client-driven paging controls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRequest {
    pub start_key: Option<FlatRecord>,
    pub limit: Option<u32>,
}

impl PageRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_start_key(mut self, start_key: FlatRecord) -> Self {
        self.start_key = Some(start_key);
        self
    }

    /// Resume from an opaque cursor handed out with a previous page.
    pub fn with_cursor(mut self, cursor: &Cursor) -> Result<Self, CursorError> {
        self.start_key = Some(cursor.decode()?);
        Ok(self)
    }
}

/// A page of typed results and the key to continue from.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub last_evaluated_key: Option<FlatRecord>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }

    /// Opaque cursor for the next page, if there is one.
    pub fn cursor(&self) -> Result<Option<Cursor>, CursorError> {
        self.last_evaluated_key
            .as_ref()
            .map(Cursor::encode)
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_key_attributes() {
        assert_eq!(TableIndex::Primary.index_name(), None);
        assert_eq!(TableIndex::Gsi.partition_attr(), KeyAttr::SkGsi);
        assert_eq!(TableIndex::Gsi.sort_attr(), KeyAttr::GsiSk);
        assert_eq!(TableIndex::Lsi2.partition_attr(), KeyAttr::Pk);
        assert_eq!(TableIndex::Lsi2.sort_attr(), KeyAttr::Lsi2);
        assert_eq!(TableIndex::Gsi3.index_name(), Some("GSI3"));
    }

    #[test]
    fn test_cursor_attrs_include_primary_key() {
        assert_eq!(
            TableIndex::Primary.cursor_attrs(),
            vec![KeyAttr::Pk, KeyAttr::SkGsi]
        );
        assert_eq!(
            TableIndex::Gsi.cursor_attrs(),
            vec![KeyAttr::Pk, KeyAttr::SkGsi, KeyAttr::GsiSk]
        );
        assert_eq!(
            TableIndex::Gsi2.cursor_attrs(),
            vec![KeyAttr::Pk, KeyAttr::SkGsi, KeyAttr::Gsi2, KeyAttr::Gsi2Sk]
        );
    }

    #[test]
    fn test_sort_condition_equals_rejects_prefix() {
        let full = Composed::Full("editor:u1".to_string());
        assert_eq!(
            SortCondition::equals(full),
            Ok(SortCondition::Equals("editor:u1".to_string()))
        );
        assert!(SortCondition::equals(Composed::Prefix("editor:".to_string())).is_err());
    }

    #[test]
    fn test_sort_condition_matching() {
        let begins = SortCondition::begins_with(Composed::Prefix("changelog:".to_string()));
        assert!(begins.is_satisfied_by("changelog:2024-01-01T00:00:00Z"));
        assert!(!begins.is_satisfied_by("editor:u1"));

        let equals = SortCondition::Equals("lineDetails".to_string());
        assert!(equals.is_satisfied_by("lineDetails"));
        assert!(!equals.is_satisfied_by("lineDetailsX"));
    }

    #[test]
    fn test_query_request_builder_defaults() {
        let request = QueryRequest::new(TableIndex::Gsi2, "country:pl");
        assert!(request.scan_forward);
        assert_eq!(request.limit, None);
        assert_eq!(request.sort, None);

        let request = request.with_limit(Some(10)).with_scan_forward(false);
        assert_eq!(request.limit, Some(10));
        assert!(!request.scan_forward);
    }

    #[test]
    fn test_page_cursor_absent_without_continuation() {
        let page: Page<u8> = Page {
            items: vec![1, 2],
            last_evaluated_key: None,
        };
        assert!(!page.has_more());
        assert_eq!(page.cursor(), Ok(None));
    }
}
