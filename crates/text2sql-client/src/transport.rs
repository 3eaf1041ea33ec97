//! Request descriptors and the HTTP transport seam.
//!
//! Domain clients never talk to `reqwest` directly. They build a
//! [`RequestDescriptor`] and hand it to a [`Service`], which sends it through a
//! [`Transport`] and decodes the reply. Tests swap the transport for a
//! recording one.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::Endpoint;
use crate::error::{ClientError, ClientResult};

/// HTTP methods used by the backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// One file or field of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// A multipart form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form carrying a single CSV file under the `csv_file` field.
    pub fn csv_file(file_name: &str, bytes: Vec<u8>) -> Self {
        Self::new().file("csv_file", file_name, "text/csv", bytes)
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            file_name: Some(file_name.to_string()),
            content_type: Some(content_type.to_string()),
            bytes,
        });
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            file_name: None,
            content_type: None,
            bytes: value.as_bytes().to_vec(),
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    fn to_reqwest(&self) -> ClientResult<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for part in &self.parts {
            let mut p = reqwest::multipart::Part::bytes(part.bytes.clone());
            if let Some(file_name) = &part.file_name {
                p = p.file_name(file_name.clone());
            }
            if let Some(content_type) = &part.content_type {
                p = p
                    .mime_str(content_type)
                    .map_err(|e| ClientError::InvalidRequest(format!("bad content type '{}': {}", content_type, e)))?;
            }
            form = form.part(part.name.clone(), p);
        }
        Ok(form)
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

/// Everything needed to issue one call, relative to an [`Endpoint`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Body,
}

impl RequestDescriptor {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            query: Vec::new(),
            body: Body::Empty,
        }
    }

    /// Append a query parameter. Repeated keys are kept in order.
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = Body::Multipart(form);
        self
    }

    /// Value of the first query parameter named `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// JSON body, if any.
    pub fn json_body(&self) -> Option<&serde_json::Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Absolute URL against `endpoint`, with the query string encoded.
    pub fn url(&self, endpoint: &Endpoint) -> ClientResult<reqwest::Url> {
        let raw = format!("{}{}", endpoint.base_url(), self.path);
        let mut url = reqwest::Url::parse(&raw)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", raw, e)))?;

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }
}

/// Percent-encode one path segment.
///
/// Empty, `.` and `..` are rejected: URL parsing folds dot segments (even
/// percent-encoded ones) into the parent path, which would address a
/// different endpoint.
pub fn segment(value: &str) -> ClientResult<String> {
    if matches!(value, "" | "." | "..") {
        return Err(ClientError::InvalidRequest(format!(
            "'{}' is not a valid path segment",
            value
        )));
    }
    Ok(urlencoding::encode(value).into_owned())
}

/// Status and raw body of a completed exchange, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one request and returns the raw reply.
///
/// Implementations must report a reply with any status code as `Ok`; status
/// handling happens in [`Service`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, endpoint: &Endpoint, request: &RequestDescriptor) -> ClientResult<RawResponse>;
}

/// `reqwest`-backed transport. One instance is shared by all domain clients.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ClientError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

fn map_reqwest_error(url: &reqwest::Url, err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout { url: url.to_string() }
    } else {
        ClientError::Network {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, endpoint: &Endpoint, request: &RequestDescriptor) -> ClientResult<RawResponse> {
        let url = request.url(endpoint)?;

        let mut builder = match request.method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self.client.post(url.clone()),
        }
        .timeout(endpoint.timeout());

        builder = match &request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Multipart(form) => builder.multipart(form.to_reqwest()?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| map_reqwest_error(&url, e))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| map_reqwest_error(&url, e))?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// A domain's endpoint binding paired with the shared transport.
#[derive(Clone)]
pub struct Service {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
}

impl Service {
    pub fn new(endpoint: Endpoint, transport: Arc<dyn Transport>) -> Self {
        Self { endpoint, transport }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Send and return the raw successful response.
    ///
    /// Non-2xx replies become [`ClientError::Status`].
    pub async fn send(&self, request: RequestDescriptor) -> ClientResult<RawResponse> {
        let started = Instant::now();
        debug!(
            method = %request.method,
            base = %self.endpoint.base_url(),
            path = %request.path,
            "Sending request"
        );

        let response = self.transport.send(&self.endpoint, &request).await?;

        if !response.is_success() {
            let body = response.text();
            warn!(
                method = %request.method,
                path = %request.path,
                status = response.status,
                "Backend returned error status"
            );
            return Err(ClientError::Status {
                status: response.status,
                body,
            });
        }

        debug!(
            path = %request.path,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Request completed"
        );
        Ok(response)
    }

    /// Send and decode the JSON reply.
    pub async fn call<T: DeserializeOwned>(&self, request: RequestDescriptor) -> ClientResult<T> {
        let path = request.path.clone();
        let response = self.send(request).await?;
        serde_json::from_slice(&response.body).map_err(|source| ClientError::Decode {
            url: format!("{}{}", self.endpoint.base_url(), path),
            source,
        })
    }
}
