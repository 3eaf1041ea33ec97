//! Database introspection client (`/api/database`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ClientResult;
use crate::transport::{segment, RequestDescriptor, Service};

/// ER diagram data for one database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErDiagram {
    #[serde(default)]
    pub tables: Vec<ErTable>,
    #[serde(default)]
    pub relationships: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ErColumn>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    /// Key marker as reported by the server (`PRI`, `MUL`, `UNI` or empty).
    #[serde(default)]
    pub key: String,
}

/// Read-only discovery against the relational metadata service.
#[derive(Clone)]
pub struct DatabaseClient {
    service: Service,
}

impl DatabaseClient {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    /// List database names.
    pub async fn list_databases(&self) -> ClientResult<Vec<String>> {
        self.service.call(RequestDescriptor::get("/databases")).await
    }

    /// List table names in `database`.
    pub async fn list_tables(&self, database: &str) -> ClientResult<Vec<String>> {
        self.service
            .call(RequestDescriptor::get(format!("/databases/{}/tables", segment(database)?)))
            .await
    }

    /// `CREATE TABLE` statements keyed by table name.
    pub async fn get_all_schemas(&self, database: &str) -> ClientResult<BTreeMap<String, String>> {
        self.service
            .call(RequestDescriptor::get(format!("/databases/{}/schema", segment(database)?)))
            .await
    }

    pub async fn generate_er_diagram(&self, database: &str) -> ClientResult<ErDiagram> {
        self.service
            .call(RequestDescriptor::get(format!("/databases/{}/er", segment(database)?)))
            .await
    }
}
