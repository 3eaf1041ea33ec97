//! Recording transport for tests of code built on the clients.
//!
//! Compiled for this crate's own tests and, for dependents, behind the
//! `testing` feature.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::config::Endpoint;
use crate::error::{ClientError, ClientResult};
use crate::transport::{RawResponse, RequestDescriptor, Transport};

/// Records every request and answers from a queue of canned replies.
///
/// With an empty queue it answers `200 {}`.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<(Endpoint, RequestDescriptor)>>,
    replies: Mutex<VecDeque<ClientResult<RawResponse>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, status: u16, body: &str) {
        self.replies.lock().unwrap().push_back(Ok(RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        }));
    }

    pub fn push_json(&self, body: serde_json::Value) {
        self.push_reply(200, &body.to_string());
    }

    pub fn push_error(&self, err: ClientError) {
        self.replies.lock().unwrap().push_back(Err(err));
    }

    pub fn requests(&self) -> Vec<(Endpoint, RequestDescriptor)> {
        self.requests.lock().unwrap().clone()
    }

    /// The single request recorded so far; panics unless exactly one was sent.
    pub fn only_request(&self) -> (Endpoint, RequestDescriptor) {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request, got {}", requests.len());
        requests.into_iter().next().unwrap()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, endpoint: &Endpoint, request: &RequestDescriptor) -> ClientResult<RawResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.clone(), request.clone()));

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(RawResponse {
                    status: 200,
                    body: b"{}".to_vec(),
                })
            })
    }
}
