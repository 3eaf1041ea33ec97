//! Graph operations client (`/api/graph`).
//!
//! Converts SQL DDL into Cypher, loads it into the property graph and
//! queries or clears the graph.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::ClientResult;
use crate::transport::{RequestDescriptor, Service};
use crate::Message;

/// Default cap on graph query results.
pub const DEFAULT_QUERY_LIMIT: u32 = 100;

/// Cypher produced from SQL DDL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CypherScript {
    #[serde(default)]
    pub cypher: String,
}

/// Outcome of loading a Cypher script statement by statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InsertSummary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub success: u64,
    #[serde(default)]
    pub failed: Vec<serde_json::Value>,
}

/// Arguments for [`GraphClient::query_graph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQuery {
    pub input_string: String,
    pub limit: u32,
    pub return_data: bool,
}

impl GraphQuery {
    /// Query with the default limit (100) returning materialized data.
    pub fn new(input_string: impl Into<String>) -> Self {
        Self {
            input_string: input_string.into(),
            limit: DEFAULT_QUERY_LIMIT,
            return_data: true,
        }
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn return_data(mut self, return_data: bool) -> Self {
        self.return_data = return_data;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQueryResult {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Client for the property-graph backend.
#[derive(Clone)]
pub struct GraphClient {
    service: Service,
}

impl GraphClient {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    /// Translate SQL DDL text into a Cypher script.
    pub async fn sql_to_cypher(&self, content: &str) -> ClientResult<CypherScript> {
        self.service
            .call(RequestDescriptor::post("/sql-to-cypher").json(json!({ "content": content })))
            .await
    }

    /// Execute a Cypher script against the graph store.
    pub async fn insert_cypher(&self, cypher_content: &str) -> ClientResult<InsertSummary> {
        self.service
            .call(RequestDescriptor::post("/insert").json(json!({ "cypher_content": cypher_content })))
            .await
    }

    pub async fn query_graph(&self, query: &GraphQuery) -> ClientResult<GraphQueryResult> {
        self.service
            .call(RequestDescriptor::post("/query").json(json!({
                "input_string": query.input_string,
                "limit": query.limit,
                "return_data": query.return_data,
            })))
            .await
    }

    /// Delete every node and relationship.
    ///
    /// `confirm` is sent as given; the server refuses with 400 when it is false.
    pub async fn clear_graph(&self, confirm: bool) -> ClientResult<Message> {
        self.service
            .call(RequestDescriptor::post("/clear").json(json!({ "confirm": confirm })))
            .await
    }
}
