//! LLM description client (`/api/llm`).
//!
//! Both generation calls are slow: the backend asks the model about each table
//! in turn. The binding's timeout is correspondingly long.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ClientResult;
use crate::transport::{segment, RequestDescriptor, Service};
use crate::Message;

/// Arguments for [`LlmClient::generate_table_descriptions`].
///
/// Every field is forwarded as a query parameter, including `database`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescribeQuery {
    pub database: String,
    /// Restrict generation to these tables; empty means all tables.
    pub tables: Vec<String>,
    /// Additional parameters passed through verbatim.
    pub extra: Vec<(String, String)>,
}

impl DescribeQuery {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Default::default()
        }
    }

    pub fn tables<I, S>(mut self, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tables = tables.into_iter().map(Into::into).collect();
        self
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.extra.push((key.to_string(), value.to_string()));
        self
    }

    fn to_request(&self) -> ClientResult<RequestDescriptor> {
        let mut request = RequestDescriptor::get(format!("/database/{}", segment(&self.database)?))
            .query("database", &self.database);
        for table in &self.tables {
            request = request.query("tables", table);
        }
        for (key, value) in &self.extra {
            request = request.query(key, value);
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    #[serde(default)]
    pub table_name: String,
    #[serde(default)]
    pub chinese_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub purpose: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    #[serde(default)]
    pub field_name: String,
    #[serde(default)]
    pub chinese_name: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub usage: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricInfo {
    #[serde(default)]
    pub metric_name: String,
    #[serde(default)]
    pub expression: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub description: String,
}

/// Generated description of one table, its fields and derived metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescription {
    #[serde(default)]
    pub table_info: TableInfo,
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
    #[serde(default)]
    pub metrics: Vec<MetricInfo>,
}

/// A knowledge item ready for insertion into a vector collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorItem {
    /// `table`, `column` or `metric`.
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

#[derive(Clone)]
pub struct LlmClient {
    service: Service,
}

impl LlmClient {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    /// Generate descriptions for the tables of `query.database`.
    pub async fn generate_table_descriptions(&self, query: &DescribeQuery) -> ClientResult<Vec<TableDescription>> {
        self.service.call(query.to_request()?).await
    }

    /// Reshape generated metadata into vector-store items.
    pub async fn format_vector_items<T: Serialize>(&self, metadata: &[T]) -> ClientResult<Vec<VectorItem>> {
        self.service
            .call(RequestDescriptor::post("/format-vector-items").json(json!({ "metadata": metadata })))
            .await
    }

    /// Abort a running description task on the server.
    pub async fn cancel_task(&self, task_id: &str) -> ClientResult<Message> {
        self.service
            .call(RequestDescriptor::post(format!("/tasks/{}/cancel", segment(task_id)?)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, Domain};
    use crate::testing::RecordingTransport;
    use crate::transport::{Body, Method};
    use std::sync::Arc;
    use std::time::Duration;

    fn client() -> (LlmClient, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let config = ApiConfig::new("http://backend:8000");
        let service = Service::new(config.endpoint(Domain::Llm), transport.clone());
        (LlmClient::new(service), transport)
    }

    #[tokio::test]
    async fn test_describe_forwards_all_fields() {
        let (client, transport) = client();
        transport.push_json(json!([]));

        let query = DescribeQuery::new("sales")
            .tables(["orders", "users"])
            .param("lang", "en");
        client.generate_table_descriptions(&query).await.unwrap();

        let (endpoint, request) = transport.only_request();
        assert_eq!(endpoint.base_url(), "http://backend:8000/api/llm");
        assert_eq!(endpoint.timeout(), Duration::from_millis(30_000_000));
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/database/sales");
        assert_eq!(
            request.query,
            vec![
                ("database".to_string(), "sales".to_string()),
                ("tables".to_string(), "orders".to_string()),
                ("tables".to_string(), "users".to_string()),
                ("lang".to_string(), "en".to_string()),
            ]
        );
        assert_eq!(request.body, Body::Empty);
    }

    #[tokio::test]
    async fn test_describe_encodes_database_segment() {
        let (client, transport) = client();
        transport.push_json(json!([]));

        client
            .generate_table_descriptions(&DescribeQuery::new("my db"))
            .await
            .unwrap();

        let (endpoint, request) = transport.only_request();
        assert_eq!(request.path, "/database/my%20db");
        assert_eq!(
            request.url(&endpoint).unwrap().as_str(),
            "http://backend:8000/api/llm/database/my%20db?database=my+db"
        );
    }

    #[tokio::test]
    async fn test_dot_segments_rejected_before_sending() {
        let (client, transport) = client();

        let err = client
            .generate_table_descriptions(&DescribeQuery::new(".."))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::ClientError::InvalidRequest(_)));
        assert!(client.cancel_task(".").await.is_err());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_describe_decodes_descriptions() {
        let (client, transport) = client();
        transport.push_json(json!([{
            "table_info": { "table_name": "orders", "chinese_name": "订单", "description": "Orders", "purpose": "Sales" },
            "fields": [{ "field_name": "id", "chinese_name": "编号", "data_type": "int", "description": "PK", "usage": "join" }],
            "metrics": []
        }]));

        let descriptions = client
            .generate_table_descriptions(&DescribeQuery::new("sales"))
            .await
            .unwrap();
        assert_eq!(descriptions.len(), 1);
        assert_eq!(descriptions[0].table_info.table_name, "orders");
        assert_eq!(descriptions[0].fields[0].data_type, "int");
    }

    #[tokio::test]
    async fn test_format_vector_items() {
        let (client, transport) = client();
        transport.push_json(json!([
            { "type": "table", "content": "表名: orders", "metadata": { "name": "orders" } }
        ]));

        let description = TableDescription {
            table_info: TableInfo {
                table_name: "orders".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let items = client.format_vector_items(&[description.clone()]).await.unwrap();
        assert_eq!(items[0].kind, "table");
        assert_eq!(items[0].metadata["name"], "orders");

        let (_, request) = transport.only_request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/format-vector-items");
        assert_eq!(
            request.json_body(),
            Some(&json!({ "metadata": [serde_json::to_value(&description).unwrap()] }))
        );
    }

    #[tokio::test]
    async fn test_cancel_task() {
        let (client, transport) = client();
        transport.push_json(json!({ "message": "cancelled" }));

        let reply = client.cancel_task("1b9d-4f").await.unwrap();
        assert_eq!(reply.message, "cancelled");

        let (_, request) = transport.only_request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/tasks/1b9d-4f/cancel");
    }
}
