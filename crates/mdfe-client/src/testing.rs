//! Test utilities for mdfe-client
//!
//! Provides a live test server wrapper and an in-memory transport that
//! records every request the dispatcher issues.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use tokio::net::TcpListener;

use crate::config::ClientConfig;
use crate::endpoint::HttpMethod;
use crate::transport::{RequestOptions, Transport, TransportError};
use crate::types::{Params, Payload, RequestHeaders, ResponseBody, ResponseEnvelope};
use crate::{MdfeClient, Result};

/// A test server that automatically shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: MdfeClient,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Serve an axum Router that stands in for the NFHub API
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{routing::get, Json, Router};
    /// use mdfe_client::testing::TestServer;
    ///
    /// let router = Router::new().route("/mdfes/{id}", get(|| async { Json(json!({})) }));
    /// let server = TestServer::start(router).await?;
    /// let response = server.client.query("12345678000190", 1, Default::default()).await?;
    /// ```
    pub async fn start(router: axum::Router) -> Result<Self> {
        Self::start_with_timeout(router, Duration::from_secs(5), Duration::from_secs(2)).await
    }

    /// Create a new test server with custom timeouts
    pub async fn start_with_timeout(
        router: axum::Router,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        // Bind to any available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        let config = ClientConfig::new(format!("http://{}", addr))
            .request_timeout_ms(timeout.as_millis() as u64)
            .connect_timeout_ms(connect_timeout.as_millis() as u64);
        let client = MdfeClient::from_config(&config)?;

        Ok(Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Shutdown the server gracefully
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

// =============================================================================
// Recording transport
// =============================================================================

/// One request as seen by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub params: Params,
    pub headers: RequestHeaders,
    pub payload: Option<Payload>,
    pub options: RequestOptions,
}

enum Reply {
    Respond(ResponseEnvelope),
    Fail(TransportError),
}

/// In-memory transport that records requests and replays queued replies
///
/// With nothing queued, every request gets a `200 {}` response.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<RecordedRequest>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for the next request
    pub fn push_response(&self, response: ResponseEnvelope) {
        self.replies.lock().push_back(Reply::Respond(response));
    }

    /// Queue a transport failure for the next request
    pub fn push_failure(&self, error: TransportError) {
        self.replies.lock().push_back(Reply::Fail(error));
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Most recent request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    fn record(
        &self,
        request: RecordedRequest,
    ) -> std::result::Result<ResponseEnvelope, TransportError> {
        self.requests.lock().push(request);
        match self.replies.lock().pop_front() {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(error)) => Err(error),
            None => Ok(ResponseEnvelope::new(200, ResponseBody::Json(json!({})))),
        }
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn get(
        &self,
        path: &str,
        params: &Params,
        headers: &RequestHeaders,
        options: RequestOptions,
    ) -> std::result::Result<ResponseEnvelope, TransportError> {
        self.record(RecordedRequest {
            method: HttpMethod::Get,
            path: path.to_string(),
            params: params.clone(),
            headers: headers.clone(),
            payload: None,
            options,
        })
    }

    async fn post(
        &self,
        path: &str,
        body: Option<&Payload>,
        params: &Params,
        headers: &RequestHeaders,
        options: RequestOptions,
    ) -> std::result::Result<ResponseEnvelope, TransportError> {
        self.record(RecordedRequest {
            method: HttpMethod::Post,
            path: path.to_string(),
            params: params.clone(),
            headers: headers.clone(),
            payload: body.cloned(),
            options,
        })
    }

    async fn delete(
        &self,
        path: &str,
        params: &Params,
        headers: &RequestHeaders,
        options: RequestOptions,
    ) -> std::result::Result<ResponseEnvelope, TransportError> {
        self.record(RecordedRequest {
            method: HttpMethod::Delete,
            path: path.to_string(),
            params: params.clone(),
            headers: headers.clone(),
            payload: None,
            options,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_transport_default_reply() {
        let transport = RecordingTransport::new();
        let response = transport
            .get("mdfes/1", &Params::new(), &Vec::new(), RequestOptions::default())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(transport.last_request().unwrap().path, "mdfes/1");
    }

    #[tokio::test]
    async fn test_recording_transport_replays_in_order() {
        let transport = RecordingTransport::new();
        transport.push_failure(TransportError::Timeout);
        transport.push_response(ResponseEnvelope::new(404, ResponseBody::Json(json!(null))));

        let first = transport
            .delete("mdfes/1", &Params::new(), &Vec::new(), RequestOptions::default())
            .await;
        assert!(matches!(first, Err(TransportError::Timeout)));

        let second = transport
            .delete("mdfes/1", &Params::new(), &Vec::new(), RequestOptions::default())
            .await
            .unwrap();
        assert_eq!(second.status, 404);
    }
}
