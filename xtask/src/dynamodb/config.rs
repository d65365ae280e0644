//! Table configuration types (Functional Core - pure data).

use slackmap_core::storage::TableIndex;

/// Table schema configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: KeyAttribute,
    /// Local indexes share the table's partition key and can only be created with it.
    pub lsis: Vec<IndexConfig>,
    pub gsis: Vec<IndexConfig>,
    pub billing_mode: BillingMode,
}

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl KeyAttribute {
    fn string(name: &str) -> Self {
        Self {
            name: name.to_string(),
            attribute_type: AttributeType::String,
        }
    }
}

/// DynamoDB attribute types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
}

/// Secondary index configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexConfig {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: KeyAttribute,
    pub projection: ProjectionType,
}

/// Index projection type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionType {
    All,
}

/// Billing mode for the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillingMode {
    PayPerRequest,
}

impl TableConfig {
    /// Sets the table name.
    pub fn with_table_name(mut self, name: &str) -> Self {
        self.table_name = name.to_string();
        self
    }

    /// Every key attribute the table and its indexes use, without duplicates.
    pub fn key_attributes(&self) -> Vec<&KeyAttribute> {
        let mut attributes: Vec<&KeyAttribute> = vec![&self.partition_key, &self.sort_key];
        for index in self.lsis.iter().chain(&self.gsis) {
            for key in [&index.partition_key, &index.sort_key] {
                if !attributes.iter().any(|a| a.name == key.name) {
                    attributes.push(key);
                }
            }
        }
        attributes
    }
}

/// Returns the table configuration for slackmap, derived from the indexes the
/// storage layer queries. This is a pure function - no I/O.
pub fn slackmap_table_config() -> TableConfig {
    let primary = TableIndex::Primary;
    let mut config = TableConfig {
        table_name: "slackmap".to_string(),
        partition_key: KeyAttribute::string(primary.partition_attr().name()),
        sort_key: KeyAttribute::string(primary.sort_attr().name()),
        lsis: Vec::new(),
        gsis: Vec::new(),
        billing_mode: BillingMode::PayPerRequest,
    };

    for index in TableIndex::ALL {
        let Some(name) = index.index_name() else {
            continue;
        };
        let index_config = IndexConfig {
            name: name.to_string(),
            partition_key: KeyAttribute::string(index.partition_attr().name()),
            sort_key: KeyAttribute::string(index.sort_attr().name()),
            projection: ProjectionType::All,
        };
        if index.partition_attr() == primary.partition_attr() {
            config.lsis.push(index_config);
        } else {
            config.gsis.push(index_config);
        }
    }

    config
}
