//! DynamoDB storage client.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{
    AttributeValue, DeleteRequest, PutRequest, WriteRequest as SdkWriteRequest,
};
use aws_sdk_dynamodb::Client;

use slackmap_core::storage::{
    FlatRecord, QueryPage, QueryRequest, RepositoryError, Result, SortCondition, StorageClient,
    WriteRequest,
};

use super::conversions::{item_to_record, record_to_item};
use super::error::{
    map_batch_write_error, map_delete_item_error, map_get_item_error, map_put_item_error,
    map_query_error,
};
use crate::config::Config;

/// DynamoDB-backed storage bound to one table.
#[derive(Debug, Clone)]
pub struct DynamoDbStorage {
    client: Client,
    table_name: String,
}

impl DynamoDbStorage {
    /// Creates a new storage client with the given DynamoDB client and table name.
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Creates a storage client from configuration.
    ///
    /// Uses the AWS SDK default credential chain, and `dynamodb_endpoint` when set.
    pub async fn from_config(config: &Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(endpoint) = &config.dynamodb_endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        Self::new(Client::new(&sdk_config), config.table_name.clone())
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

/// Key condition expression with its placeholder maps.
#[derive(Debug, Clone, PartialEq)]
struct KeyCondition {
    expression: String,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl KeyCondition {
    fn for_request(request: &QueryRequest) -> Self {
        let mut names = HashMap::from([(
            "#pk".to_string(),
            request.index.partition_attr().name().to_string(),
        )]);
        let mut values = HashMap::from([(
            ":pk".to_string(),
            AttributeValue::S(request.partition.clone()),
        )]);

        let expression = match &request.sort {
            None => "#pk = :pk".to_string(),
            Some(condition) => {
                names.insert(
                    "#sk".to_string(),
                    request.index.sort_attr().name().to_string(),
                );
                let (expression, value) = match condition {
                    SortCondition::Equals(value) => ("#pk = :pk AND #sk = :sk", value),
                    SortCondition::BeginsWith(prefix) => {
                        ("#pk = :pk AND begins_with(#sk, :sk)", prefix)
                    }
                };
                values.insert(":sk".to_string(), AttributeValue::S(value.clone()));
                expression.to_string()
            }
        };

        Self {
            expression,
            names,
            values,
        }
    }
}

fn to_sdk_write(request: &WriteRequest) -> Result<SdkWriteRequest> {
    let builder = SdkWriteRequest::builder();
    let builder = match request {
        WriteRequest::Put(record) => builder.put_request(
            PutRequest::builder()
                .set_item(Some(record_to_item(record)))
                .build()
                .map_err(|e| RepositoryError::InvalidData(e.to_string()))?,
        ),
        WriteRequest::Delete(key) => builder.delete_request(
            DeleteRequest::builder()
                .set_key(Some(record_to_item(key)))
                .build()
                .map_err(|e| RepositoryError::InvalidData(e.to_string()))?,
        ),
    };
    Ok(builder.build())
}

fn from_sdk_write(request: SdkWriteRequest) -> Result<Option<WriteRequest>> {
    if let Some(put) = request.put_request {
        return item_to_record(&put.item).map(|record| Some(WriteRequest::Put(record)));
    }
    if let Some(delete) = request.delete_request {
        return item_to_record(&delete.key).map(|key| Some(WriteRequest::Delete(key)));
    }
    Ok(None)
}

#[async_trait]
impl StorageClient for DynamoDbStorage {
    async fn get(&self, key: &FlatRecord) -> Result<Option<FlatRecord>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(record_to_item(key)))
            .send()
            .await
            .map_err(|e| map_get_item_error(e, &self.table_name))?;

        result.item.as_ref().map(item_to_record).transpose()
    }

    async fn query(&self, request: &QueryRequest) -> Result<QueryPage> {
        let condition = KeyCondition::for_request(request);
        let limit = request
            .limit
            .map(|limit| i32::try_from(limit).unwrap_or(i32::MAX));

        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .set_index_name(request.index.index_name().map(String::from))
            .key_condition_expression(condition.expression)
            .set_expression_attribute_names(Some(condition.names))
            .set_expression_attribute_values(Some(condition.values))
            .scan_index_forward(request.scan_forward)
            .set_limit(limit)
            .set_exclusive_start_key(request.exclusive_start_key.as_ref().map(record_to_item))
            .send()
            .await
            .map_err(|e| map_query_error(e, &self.table_name))?;

        let items = result
            .items
            .unwrap_or_default()
            .iter()
            .map(item_to_record)
            .collect::<Result<Vec<_>>>()?;
        let last_evaluated_key = result
            .last_evaluated_key
            .as_ref()
            .map(item_to_record)
            .transpose()?;

        tracing::debug!(
            index = ?request.index,
            items = items.len(),
            has_more = last_evaluated_key.is_some(),
            "DynamoDB query"
        );

        Ok(QueryPage {
            items,
            last_evaluated_key,
        })
    }

    async fn put(&self, record: FlatRecord) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(record_to_item(&record)))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, &self.table_name))?;

        Ok(())
    }

    async fn delete(&self, key: &FlatRecord) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(record_to_item(key)))
            .send()
            .await
            .map_err(|e| map_delete_item_error(e, &self.table_name))?;

        Ok(())
    }

    async fn batch_write(&self, requests: Vec<WriteRequest>) -> Result<Vec<WriteRequest>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let writes = requests
            .iter()
            .map(to_sdk_write)
            .collect::<Result<Vec<_>>>()?;

        let result = self
            .client
            .batch_write_item()
            .request_items(&self.table_name, writes)
            .send()
            .await
            .map_err(|e| map_batch_write_error(e, &self.table_name))?;

        let mut unprocessed = Vec::new();
        for request in result
            .unprocessed_items
            .unwrap_or_default()
            .into_values()
            .flatten()
        {
            if let Some(request) = from_sdk_write(request)? {
                unprocessed.push(request);
            }
        }

        tracing::debug!(
            submitted = requests.len(),
            unprocessed = unprocessed.len(),
            "DynamoDB batch write"
        );

        Ok(unprocessed)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use slackmap_core::storage::TableIndex;

    use super::*;

    #[test]
    fn test_partition_only_condition() {
        let condition = KeyCondition::for_request(&QueryRequest::new(TableIndex::Gsi3, "user:u1"));
        assert_eq!(condition.expression, "#pk = :pk");
        assert_eq!(condition.names["#pk"], "GSI3");
        assert_eq!(condition.values[":pk"], AttributeValue::S("user:u1".to_string()));
        assert!(!condition.names.contains_key("#sk"));
    }

    #[test]
    fn test_begins_with_condition() {
        let request = QueryRequest::new(TableIndex::Lsi, "feature:f1:line")
            .with_sort(SortCondition::BeginsWith("editorType:owner:".to_string()));
        let condition = KeyCondition::for_request(&request);
        assert_eq!(condition.expression, "#pk = :pk AND begins_with(#sk, :sk)");
        assert_eq!(condition.names["#pk"], "PK");
        assert_eq!(condition.names["#sk"], "LSI");
        assert_eq!(
            condition.values[":sk"],
            AttributeValue::S("editorType:owner:".to_string())
        );
    }

    #[test]
    fn test_equals_condition_on_gsi() {
        let request = QueryRequest::new(TableIndex::Gsi, "countryInfo")
            .with_sort(SortCondition::Equals("country:pl".to_string()));
        let condition = KeyCondition::for_request(&request);
        assert_eq!(condition.expression, "#pk = :pk AND #sk = :sk");
        assert_eq!(condition.names["#pk"], "SK_GSI");
        assert_eq!(condition.names["#sk"], "GSI_SK");
    }

    #[test]
    fn test_write_request_round_trip() {
        let mut key = FlatRecord::new();
        key.insert("PK".to_string(), json!("feature:f1:line"));
        key.insert("SK_GSI".to_string(), json!("editor:u1"));

        for request in [WriteRequest::Put(key.clone()), WriteRequest::Delete(key)] {
            let sdk = to_sdk_write(&request).unwrap();
            assert_eq!(from_sdk_write(sdk).unwrap(), Some(request));
        }
    }
}
