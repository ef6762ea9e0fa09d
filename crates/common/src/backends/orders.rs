//! DynamoDB order store
//!
//! Provides:
//! - `GetItem` lookup by order id
//! - Attribute-map to JSON conversion for aggregation

use crate::backends::OrderLookup;
use crate::config::OrdersConfig;
use crate::errors::{AppError, Result};
use crate::routing::BackendResponse;
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use tracing::debug;

/// DynamoDB-backed order store client.
pub struct DynamoOrderStore {
    client: DynamoClient,
    table: String,
    key_attribute: String,
}

impl DynamoOrderStore {
    /// Create a store over the shared AWS configuration.
    pub fn new(sdk_config: &aws_config::SdkConfig, config: &OrdersConfig) -> Self {
        Self::with_client(DynamoClient::new(sdk_config), config)
    }

    /// Create a store with an existing client.
    pub fn with_client(client: DynamoClient, config: &OrdersConfig) -> Self {
        Self {
            client,
            table: config.table.clone(),
            key_attribute: config.key_attribute.clone(),
        }
    }
}

#[async_trait]
impl OrderLookup for DynamoOrderStore {
    async fn order_details(&self, order_id: &str) -> Result<BackendResponse> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(&self.key_attribute, AttributeValue::S(order_id.to_string()))
            .send()
            .await
            .map_err(|e| AppError::OrderStore {
                message: format!("GetItem on '{}' failed: {}", self.table, e),
            })?;

        match result.item {
            Some(item) => {
                debug!(table = %self.table, order_id, "order record found");
                Ok(BackendResponse::Found(item_to_json(&item)))
            }
            None => {
                debug!(table = %self.table, order_id, "order record absent");
                Ok(BackendResponse::NotFound)
            }
        }
    }
}

/// Convert a DynamoDB item into a JSON object.
pub fn item_to_json(item: &HashMap<String, AttributeValue>) -> Value {
    let mut object = Map::new();
    for (name, attribute) in item {
        object.insert(name.clone(), attribute_to_json(attribute));
    }
    Value::Object(object)
}

/// Convert a single DynamoDB attribute into JSON.
///
/// Numbers that fit JSON stay numeric; anything else falls back to its
/// string form so no attribute is ever dropped.
pub fn attribute_to_json(attribute: &AttributeValue) -> Value {
    match attribute {
        AttributeValue::S(text) => Value::String(text.clone()),
        AttributeValue::N(number) => number
            .parse::<i64>()
            .ok()
            .map(|n| Value::Number(n.into()))
            .or_else(|| {
                number
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            })
            .unwrap_or_else(|| Value::String(number.clone())),
        AttributeValue::Bool(flag) => Value::Bool(*flag),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(list) => Value::Array(list.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => item_to_json(map),
        AttributeValue::Ss(strings) => Value::Array(
            strings
                .iter()
                .map(|s| Value::String(s.clone()))
                .collect(),
        ),
        AttributeValue::Ns(numbers) => Value::Array(
            numbers
                .iter()
                .map(|n| attribute_to_json(&AttributeValue::N(n.clone())))
                .collect(),
        ),
        other => Value::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_attributes_convert() {
        assert_eq!(
            attribute_to_json(&AttributeValue::S("T123".to_string())),
            json!("T123")
        );
        assert_eq!(attribute_to_json(&AttributeValue::N("42".to_string())), json!(42));
        assert_eq!(
            attribute_to_json(&AttributeValue::N("1.5".to_string())),
            json!(1.5)
        );
        assert_eq!(attribute_to_json(&AttributeValue::Bool(true)), json!(true));
        assert_eq!(attribute_to_json(&AttributeValue::Null(true)), Value::Null);
    }

    #[test]
    fn test_unparseable_number_falls_back_to_string() {
        assert_eq!(
            attribute_to_json(&AttributeValue::N("not-a-number".to_string())),
            json!("not-a-number")
        );
    }

    #[test]
    fn test_nested_item_converts_to_object() {
        let mut inner = HashMap::new();
        inner.insert("kva".to_string(), AttributeValue::N("500".to_string()));

        let mut item = HashMap::new();
        item.insert(
            "order_id".to_string(),
            AttributeValue::S("T123".to_string()),
        );
        item.insert("transformer".to_string(), AttributeValue::M(inner));
        item.insert(
            "tags".to_string(),
            AttributeValue::L(vec![
                AttributeValue::S("priority".to_string()),
                AttributeValue::N("3".to_string()),
            ]),
        );

        let value = item_to_json(&item);

        assert_eq!(value["order_id"], json!("T123"));
        assert_eq!(value["transformer"], json!({"kva": 500}));
        assert_eq!(value["tags"], json!(["priority", 3]));
    }

    #[test]
    fn test_string_set_converts_to_array() {
        let attribute = AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]);

        assert_eq!(attribute_to_json(&attribute), json!(["a", "b"]));
    }
}
