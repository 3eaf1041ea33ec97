//! Vector operations client (`/api/vector`).
//!
//! Embedding generation, similarity search and collection management.
//! Index builds and bulk inserts can run for many minutes on large
//! collections.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use crate::error::ClientResult;
use crate::transport::{MultipartForm, RequestDescriptor, Service};
use crate::Message;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    #[serde(default)]
    pub embedding: Vec<f32>,
}

/// One hit from a metadata collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorHit {
    #[serde(default)]
    pub distance: f32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One hit from a QA collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QaHit {
    #[serde(default)]
    pub distance: f32,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
}

/// Per-collection outcome. A failing collection does not fail the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CollectionHits<H> {
    Hits(Vec<H>),
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResults<H> {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub results: BTreeMap<String, CollectionHits<H>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionList {
    #[serde(default)]
    pub collections: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertDataSummary {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub processed_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvImportSummary {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub processed_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub collection: String,
}

/// Client for the vector backend's named collections.
#[derive(Clone)]
pub struct VectorClient {
    service: Service,
}

impl VectorClient {
    pub fn new(service: Service) -> Self {
        Self { service }
    }

    pub async fn generate_embedding(&self, text: &str) -> ClientResult<Embedding> {
        self.service
            .call(RequestDescriptor::post("/generate-embedding").json(json!({ "text": text })))
            .await
    }

    /// Similarity search across metadata collections.
    pub async fn search_vector(
        &self,
        vquery: &str,
        collections: &[String],
        top_k: u32,
    ) -> ClientResult<SearchResults<VectorHit>> {
        self.service.call(search_request("/search", vquery, collections, top_k)).await
    }

    /// Similarity search across QA collections.
    pub async fn search_qa_vector(
        &self,
        vquery: &str,
        collections: &[String],
        top_k: u32,
    ) -> ClientResult<SearchResults<QaHit>> {
        self.service.call(search_request("/search-qa", vquery, collections, top_k)).await
    }

    pub async fn list_collections(&self) -> ClientResult<CollectionList> {
        self.service.call(RequestDescriptor::get("/collections")).await
    }

    pub async fn create_collection(&self, collection_name: &str) -> ClientResult<Message> {
        self.service
            .call(RequestDescriptor::post("/create-collection").json(json!({ "collection_name": collection_name })))
            .await
    }

    pub async fn create_qa_collection(&self, collection_name: &str) -> ClientResult<Message> {
        self.service
            .call(RequestDescriptor::post("/create-qa-collection").json(json!({ "collection_name": collection_name })))
            .await
    }

    /// Drop all data and indexes of a collection. Always sends `confirm: true`.
    pub async fn clear_collection(&self, collection_name: &str) -> ClientResult<Message> {
        self.clear_collection_with(collection_name, true).await
    }

    /// Like [`clear_collection`](Self::clear_collection), but sends the
    /// caller's `confirm` value.
    pub async fn clear_collection_with(&self, collection_name: &str, confirm: bool) -> ClientResult<Message> {
        self.service
            .call(RequestDescriptor::post("/clear-collection").json(json!({
                "collection_name": collection_name,
                "confirm": confirm,
            })))
            .await
    }

    /// Bulk-insert records. Each record needs a `content` field; the server
    /// embeds it.
    pub async fn insert_data<T: Serialize>(&self, collection_name: &str, data: &[T]) -> ClientResult<InsertDataSummary> {
        self.service
            .call(RequestDescriptor::post("/insert-data").json(json!({
                "collection_name": collection_name,
                "data": data,
            })))
            .await
    }

    /// Upload a question/answer CSV into a QA collection.
    pub async fn insert_qa_csv(&self, collection_name: &str, form: MultipartForm) -> ClientResult<CsvImportSummary> {
        self.service
            .call(
                RequestDescriptor::post("/insert-qa-csv")
                    .query("collection_name", collection_name)
                    .multipart(form),
            )
            .await
    }

    /// Ask the server to build a similarity index.
    ///
    /// Whether the build has finished when this returns is up to the server;
    /// the reply is handed back untouched.
    pub async fn create_index(&self, collection_name: &str) -> ClientResult<serde_json::Value> {
        self.service
            .call(
                RequestDescriptor::post("/create-index")
                    .query("collection_name", collection_name)
                    .json(json!({})),
            )
            .await
    }
}

fn search_request(path: &str, vquery: &str, collections: &[String], top_k: u32) -> RequestDescriptor {
    RequestDescriptor::post(path).json(json!({
        "vquery": vquery,
        "collections": collections,
        "top_k": top_k,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, Domain};
    use crate::llm::VectorItem;
    use crate::testing::RecordingTransport;
    use crate::transport::{Body, Method};
    use std::sync::Arc;
    use std::time::Duration;

    fn client() -> (VectorClient, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::new());
        let config = ApiConfig::new("http://backend:8000");
        let service = Service::new(config.endpoint(Domain::Vector), transport.clone());
        (VectorClient::new(service), transport)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_generate_embedding() {
        let (client, transport) = client();
        transport.push_json(json!({ "embedding": [0.5, -0.25] }));

        let embedding = client.generate_embedding("orders by month").await.unwrap();
        assert_eq!(embedding.embedding, vec![0.5, -0.25]);

        let (endpoint, request) = transport.only_request();
        assert_eq!(endpoint.base_url(), "http://backend:8000/api/vector");
        assert_eq!(endpoint.timeout(), Duration::from_millis(2_000_000));
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/generate-embedding");
        assert_eq!(request.json_body(), Some(&json!({ "text": "orders by month" })));
    }

    #[tokio::test]
    async fn test_search_body_and_partial_failure() {
        let (client, transport) = client();
        transport.push_json(json!({
            "query": "revenue",
            "results": {
                "meta": [{ "distance": 0.12, "name": "orders", "type": "table", "description": "..." }],
                "missing": { "error": "collection not found" }
            }
        }));

        let results = client
            .search_vector("revenue", &names(&["meta", "missing"]), 3)
            .await
            .unwrap();
        match &results.results["meta"] {
            CollectionHits::Hits(hits) => {
                assert_eq!(hits[0].name.as_deref(), Some("orders"));
                assert_eq!(hits[0].kind.as_deref(), Some("table"));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(
            results.results["missing"],
            CollectionHits::Failed { error: "collection not found".into() }
        );

        let (_, request) = transport.only_request();
        assert_eq!(request.path, "/search");
        assert_eq!(
            request.json_body(),
            Some(&json!({ "vquery": "revenue", "collections": ["meta", "missing"], "top_k": 3 }))
        );
    }

    #[tokio::test]
    async fn test_search_qa() {
        let (client, transport) = client();
        transport.push_json(json!({
            "query": "how",
            "results": { "faq": [{ "distance": 0.3, "question": "how?", "answer": "so." }] }
        }));

        let results = client.search_qa_vector("how", &names(&["faq"]), 5).await.unwrap();
        match &results.results["faq"] {
            CollectionHits::Hits(hits) => assert_eq!(hits[0].answer.as_deref(), Some("so.")),
            other => panic!("unexpected: {other:?}"),
        }

        let (_, request) = transport.only_request();
        assert_eq!(request.path, "/search-qa");
        assert_eq!(
            request.json_body(),
            Some(&json!({ "vquery": "how", "collections": ["faq"], "top_k": 5 }))
        );
    }

    #[tokio::test]
    async fn test_list_collections() {
        let (client, transport) = client();
        transport.push_json(json!({ "collections": ["faq", "meta"] }));

        let list = client.list_collections().await.unwrap();
        assert_eq!(list.collections, names(&["faq", "meta"]));

        let (_, request) = transport.only_request();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/collections");
        assert_eq!(request.body, Body::Empty);
    }

    #[tokio::test]
    async fn test_create_collections() {
        let (client, transport) = client();

        client.create_collection("meta").await.unwrap();
        client.create_qa_collection("faq").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].1.path, "/create-collection");
        assert_eq!(requests[0].1.json_body(), Some(&json!({ "collection_name": "meta" })));
        assert_eq!(requests[1].1.path, "/create-qa-collection");
        assert_eq!(requests[1].1.json_body(), Some(&json!({ "collection_name": "faq" })));
    }

    #[tokio::test]
    async fn test_clear_collection_always_confirms() {
        let (client, transport) = client();

        client.clear_collection("meta").await.unwrap();

        let (_, request) = transport.only_request();
        assert_eq!(request.path, "/clear-collection");
        assert_eq!(
            request.json_body(),
            Some(&json!({ "collection_name": "meta", "confirm": true }))
        );
    }

    #[tokio::test]
    async fn test_clear_collection_with_explicit_intent() {
        let (client, transport) = client();

        client.clear_collection_with("meta", false).await.unwrap();

        let (_, request) = transport.only_request();
        assert_eq!(
            request.json_body(),
            Some(&json!({ "collection_name": "meta", "confirm": false }))
        );
    }

    #[tokio::test]
    async fn test_insert_data() {
        let (client, transport) = client();
        transport.push_json(json!({ "message": "ok", "processed_count": 1 }));

        let items = vec![VectorItem {
            kind: "table".into(),
            content: "表名: orders".into(),
            metadata: json!({ "name": "orders" }),
        }];
        let summary = client.insert_data("meta", &items).await.unwrap();
        assert_eq!(summary.processed_count, 1);

        let (_, request) = transport.only_request();
        assert_eq!(request.path, "/insert-data");
        assert_eq!(
            request.json_body(),
            Some(&json!({
                "collection_name": "meta",
                "data": [{ "type": "table", "content": "表名: orders", "metadata": { "name": "orders" } }]
            }))
        );
    }

    #[tokio::test]
    async fn test_insert_qa_csv_encodes_collection_name() {
        let (client, transport) = client();
        transport.push_json(json!({
            "message": "done", "processed_count": 2, "failed_count": 0, "collection": "faq&x=1"
        }));

        let form = MultipartForm::csv_file("qa.csv", b"q,a\n".to_vec());
        let summary = client.insert_qa_csv("faq&x=1", form.clone()).await.unwrap();
        assert_eq!(summary.processed_count, 2);

        let (endpoint, request) = transport.only_request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/insert-qa-csv");
        assert_eq!(request.body, Body::Multipart(form));

        let url = request.url(&endpoint).unwrap();
        assert_eq!(url.query(), Some("collection_name=faq%26x%3D1"));
        let pairs: Vec<_> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].1, "faq&x=1");
    }

    #[tokio::test]
    async fn test_create_index_returns_raw_reply() {
        let (client, transport) = client();
        transport.push_json(json!({ "message": "index queued", "job": 7 }));

        let reply = client.create_index("meta").await.unwrap();
        assert_eq!(reply["job"], 7);

        let (_, request) = transport.only_request();
        assert_eq!(request.path, "/create-index");
        assert_eq!(request.query_value("collection_name"), Some("meta"));
        assert_eq!(request.json_body(), Some(&json!({})));
    }

    #[tokio::test]
    async fn test_server_error_carries_status() {
        let (client, transport) = client();
        transport.push_reply(500, r#"{"detail":"Milvus connection not initialized."}"#);

        let err = client.list_collections().await.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
    }
}
