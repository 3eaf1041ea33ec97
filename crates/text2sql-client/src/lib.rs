//! # Text2SQL Client
//!
//! Typed HTTP clients for the Text2SQL backend.
//!
//! One client per backend domain (database introspection, graph, LLM
//! descriptions, vectors). Each exposes one async function per REST endpoint
//! and performs no retries, caching or validation: errors come back to the
//! caller exactly as they happened.

pub mod config;
pub mod database;
pub mod error;
pub mod graph;
pub mod llm;
pub mod transport;
pub mod vector;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use config::{ApiConfig, Domain, Endpoint, Timeouts};
pub use database::{DatabaseClient, ErColumn, ErDiagram, ErTable};
pub use error::{ClientError, ClientResult};
pub use graph::{CypherScript, GraphClient, GraphQuery, GraphQueryResult, InsertSummary};
pub use llm::{DescribeQuery, LlmClient, TableDescription, VectorItem};
pub use transport::{MultipartForm, RequestDescriptor, ReqwestTransport, Service, Transport};
pub use vector::{CollectionHits, QaHit, SearchResults, VectorClient, VectorHit};

/// Server acknowledgement carrying a human-readable message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message: String,
}

/// Backend liveness reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
}

/// All four domain clients, built once from one [`ApiConfig`] and sharing
/// one transport.
#[derive(Clone)]
pub struct ApiClients {
    pub database: DatabaseClient,
    pub graph: GraphClient,
    pub llm: LlmClient,
    pub vector: VectorClient,
    root: Service,
}

impl ApiClients {
    /// Build clients backed by `reqwest`.
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(config, transport))
    }

    /// Build clients on top of any transport.
    pub fn with_transport(config: &ApiConfig, transport: Arc<dyn Transport>) -> Self {
        let service = |domain: Domain| Service::new(config.endpoint(domain), transport.clone());

        Self {
            database: DatabaseClient::new(service(Domain::Database)),
            graph: GraphClient::new(service(Domain::Graph)),
            llm: LlmClient::new(service(Domain::Llm)),
            vector: VectorClient::new(service(Domain::Vector)),
            root: Service::new(config.root_endpoint(), transport.clone()),
        }
    }

    /// `GET /health` on the backend root.
    pub async fn health(&self) -> ClientResult<HealthStatus> {
        self.root.call(RequestDescriptor::get("/health")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_clients_share_host_and_transport() {
        let transport = Arc::new(RecordingTransport::new());
        let config = ApiConfig::new("http://10.1.1.1:8000");
        let clients = ApiClients::with_transport(&config, transport.clone());

        transport.push_json(json!([]));
        transport.push_json(json!({ "collections": [] }));
        clients.database.list_databases().await.unwrap();
        clients.vector.list_collections().await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0.base_url(), "http://10.1.1.1:8000/api/database");
        assert_eq!(requests[1].0.base_url(), "http://10.1.1.1:8000/api/vector");
    }

    #[tokio::test]
    async fn test_health() {
        let transport = Arc::new(RecordingTransport::new());
        let clients = ApiClients::with_transport(&ApiConfig::new("http://h:1"), transport.clone());
        transport.push_json(json!({ "status": "ok" }));

        let health = clients.health().await.unwrap();
        assert_eq!(health.status, "ok");

        let (endpoint, request) = transport.only_request();
        assert_eq!(request.url(&endpoint).unwrap().as_str(), "http://h:1/health");
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let transport = Arc::new(RecordingTransport::new());
        let clients = ApiClients::with_transport(&ApiConfig::default(), transport.clone());

        let (a, b) = tokio::join!(
            clients.graph.clear_graph(true),
            clients.graph.clear_graph(true)
        );
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(transport.requests().len(), 2);
    }
}
